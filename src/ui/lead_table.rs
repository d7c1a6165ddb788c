use std::rc::Rc;

use gtk4 as gtk;
use gtk4::prelude::*;
use whatzapp::browser::{LeadBrowser, LeadFilter, TableView, ViewMode};

const COLUMNS: [&str; 5] = ["Name", "Email", "Phone", "Company", "Address"];

pub struct LeadTable {
    root: gtk::Box,
    all_btn: gtk::ToggleButton,
    recent_btn: gtk::ToggleButton,
    name: gtk::Entry,
    email: gtk::Entry,
    phone: gtk::Entry,
    company: gtk::Entry,
    search_btn: gtk::Button,
    clear_btn: gtk::Button,
    status: gtk::Label,
    grid: gtk::Grid,
    footer: gtk::Label,
}

fn filter_field(form: &gtk::Box, label: &str, placeholder: &str) -> gtk::Entry {
    let column = gtk::Box::new(gtk::Orientation::Vertical, 4);
    column.set_hexpand(true);
    let lbl = gtk::Label::new(Some(label));
    lbl.add_css_class("caption-heading");
    lbl.set_halign(gtk::Align::Start);
    let entry = gtk::Entry::new();
    entry.set_placeholder_text(Some(placeholder));
    column.append(&lbl);
    column.append(&entry);
    form.append(&column);
    entry
}

fn cell(text: &str) -> gtk::Label {
    let lbl = gtk::Label::new(Some(text));
    lbl.set_halign(gtk::Align::Start);
    lbl.set_wrap(true);
    lbl.set_selectable(true);
    lbl
}

impl LeadTable {
    pub fn new() -> Self {
        let root = gtk::Box::new(gtk::Orientation::Vertical, 12);
        root.set_margin_top(12);
        root.set_margin_bottom(12);
        root.set_margin_start(12);
        root.set_margin_end(12);

        let toggles = gtk::Box::new(gtk::Orientation::Horizontal, 0);
        toggles.add_css_class("linked");
        toggles.set_halign(gtk::Align::Center);
        let all_btn = gtk::ToggleButton::with_label("All Leads");
        let recent_btn = gtk::ToggleButton::with_label("Recent Leads");
        recent_btn.set_group(Some(&all_btn));
        all_btn.set_active(true);
        toggles.append(&all_btn);
        toggles.append(&recent_btn);
        root.append(&toggles);

        let form = gtk::Box::new(gtk::Orientation::Horizontal, 8);
        let name = filter_field(&form, "Name", "Search by name...");
        let email = filter_field(&form, "Email", "Search by email...");
        let phone = filter_field(&form, "Phone", "Search by phone...");
        let company = filter_field(&form, "Company", "Search by company...");
        let search_btn = gtk::Button::with_label("Search");
        search_btn.add_css_class("suggested-action");
        search_btn.set_valign(gtk::Align::End);
        let clear_btn = gtk::Button::with_label("Clear");
        clear_btn.set_valign(gtk::Align::End);
        form.append(&search_btn);
        form.append(&clear_btn);
        root.append(&form);

        let status = gtk::Label::new(None);
        status.set_margin_top(12);
        root.append(&status);

        let grid = gtk::Grid::builder().row_spacing(8).column_spacing(16).build();
        let scroller = gtk::ScrolledWindow::builder()
            .vexpand(true)
            .hexpand(true)
            .child(&grid)
            .build();
        root.append(&scroller);

        let footer = gtk::Label::new(None);
        footer.add_css_class("dim-label");
        root.append(&footer);

        Self {
            root,
            all_btn,
            recent_btn,
            name,
            email,
            phone,
            company,
            search_btn,
            clear_btn,
            status,
            grid,
            footer,
        }
    }

    pub fn widget(&self) -> gtk::Widget {
        self.root.clone().upcast()
    }

    pub fn filter(&self) -> LeadFilter {
        LeadFilter {
            name: self.name.text().to_string(),
            phone: self.phone.text().to_string(),
            company: self.company.text().to_string(),
            email: self.email.text().to_string(),
        }
    }

    pub fn clear_entries(&self) {
        for entry in [&self.name, &self.email, &self.phone, &self.company] {
            entry.set_text("");
        }
    }

    pub fn connect_search<F: Fn(LeadFilter) + 'static>(self: &Rc<Self>, f: F) {
        let f = Rc::new(f);
        {
            let this = self.clone();
            let f = f.clone();
            self.search_btn.connect_clicked(move |_| f(this.filter()));
        }
        for entry in [&self.name, &self.email, &self.phone, &self.company] {
            let this = self.clone();
            let f = f.clone();
            entry.connect_activate(move |_| f(this.filter()));
        }
    }

    pub fn connect_clear<F: Fn() + 'static>(&self, f: F) {
        self.clear_btn.connect_clicked(move |_| f());
    }

    pub fn connect_view_mode<F: Fn(ViewMode) + 'static>(&self, f: F) {
        let f = Rc::new(f);
        for (button, mode) in [(&self.all_btn, ViewMode::All), (&self.recent_btn, ViewMode::Recent)] {
            let f = f.clone();
            button.connect_toggled(move |b| {
                if b.is_active() {
                    f(mode);
                }
            });
        }
    }

    /// Rebuilds the table from `browser`. `on_phone` receives the visible row index.
    pub fn render(&self, browser: &LeadBrowser, on_phone: Rc<dyn Fn(usize)>) {
        while let Some(child) = self.grid.first_child() {
            self.grid.remove(&child);
        }
        self.status.remove_css_class("error");

        let rows = match browser.view() {
            TableView::Loading => {
                self.show_status("Loading leads...");
                return;
            }
            TableView::Error(message) => {
                self.show_status(message);
                self.status.add_css_class("error");
                return;
            }
            TableView::Empty => {
                self.show_status("No leads found");
                return;
            }
            TableView::Rows(rows) => rows,
        };

        self.status.set_visible(false);
        for (col, title) in COLUMNS.iter().enumerate() {
            let lbl = cell(title);
            lbl.add_css_class("heading");
            self.grid.attach(&lbl, col as i32, 0, 1, 1);
        }
        for (idx, lead) in rows.iter().enumerate() {
            let row = idx as i32 + 1;
            self.grid.attach(&cell(&lead.name), 0, row, 1, 1);
            self.grid.attach(&cell(lead.email_label()), 1, row, 1, 1);

            let phone = gtk::Button::with_label(&lead.phone);
            phone.add_css_class("flat");
            phone.set_halign(gtk::Align::Start);
            let on_phone = on_phone.clone();
            phone.connect_clicked(move |_| on_phone(idx));
            self.grid.attach(&phone, 2, row, 1, 1);

            self.grid.attach(&cell(&lead.company), 3, row, 1, 1);
            self.grid.attach(&cell(&lead.address), 4, row, 1, 1);
        }
        self.footer.set_label(&browser.summary());
        self.footer.set_visible(true);
    }

    fn show_status(&self, text: &str) {
        self.status.set_label(text);
        self.status.set_visible(true);
        self.footer.set_visible(false);
    }
}

use std::rc::Rc;

use gtk4 as gtk;
use gtk4::prelude::*;
use whatzapp::api::models::Lead;
use whatzapp::chat::{ChatSession, Sender};

struct Details {
    name: gtk::Label,
    email: gtk::Label,
    phone: gtk::Label,
    company: gtk::Label,
    address: gtk::Label,
}

impl Details {
    fn fill(&self, lead: &Lead) {
        self.name.set_label(&lead.name);
        self.email.set_label(lead.email_label());
        self.phone.set_label(&lead.phone);
        self.company.set_label(&lead.company);
        self.address.set_label(&lead.address);
    }
}

pub struct ChatView {
    root: gtk::Box,
    details_stack: gtk::Stack,
    details: Details,
    chat_stack: gtk::Stack,
    header_name: gtk::Label,
    header_phone: gtk::Label,
    scroller: gtk::ScrolledWindow,
    messages_box: gtk::Box,
    entry: gtk::Entry,
    send_btn: gtk::Button,
}

fn placeholder(text: &str) -> gtk::Label {
    let lbl = gtk::Label::new(Some(text));
    lbl.add_css_class("dim-label");
    lbl.set_valign(gtk::Align::Center);
    lbl.set_vexpand(true);
    lbl
}

fn detail_row(parent: &gtk::Box, title: &str) -> gtk::Label {
    let caption = gtk::Label::new(Some(title));
    caption.add_css_class("caption-heading");
    caption.add_css_class("dim-label");
    caption.set_halign(gtk::Align::Start);
    let value = gtk::Label::new(None);
    value.set_halign(gtk::Align::Start);
    value.set_wrap(true);
    value.set_selectable(true);
    parent.append(&caption);
    parent.append(&value);
    value
}

impl ChatView {
    pub fn new() -> Self {
        let root = gtk::Box::new(gtk::Orientation::Horizontal, 12);
        root.set_margin_top(8);
        root.set_margin_bottom(8);
        root.set_margin_start(8);
        root.set_margin_end(8);

        // Lead details column
        let details_stack = gtk::Stack::new();
        details_stack.set_size_request(260, -1);
        details_stack.add_named(&placeholder("Select a lead to view details"), Some("empty"));
        let details_box = gtk::Box::new(gtk::Orientation::Vertical, 4);
        let title = gtk::Label::new(Some("Lead Details"));
        title.add_css_class("title-3");
        title.set_halign(gtk::Align::Start);
        details_box.append(&title);
        let details = Details {
            name: detail_row(&details_box, "Name"),
            email: detail_row(&details_box, "Email"),
            phone: detail_row(&details_box, "Phone"),
            company: detail_row(&details_box, "Company"),
            address: detail_row(&details_box, "Address"),
        };
        details_stack.add_named(&details_box, Some("lead"));
        root.append(&details_stack);
        root.append(&gtk::Separator::new(gtk::Orientation::Vertical));

        // Chat column
        let chat_stack = gtk::Stack::new();
        chat_stack.set_hexpand(true);
        chat_stack.add_named(
            &placeholder("Select a lead from the CRM tab to start chatting"),
            Some("empty"),
        );
        let chat_box = gtk::Box::new(gtk::Orientation::Vertical, 6);

        let header = gtk::Box::new(gtk::Orientation::Horizontal, 6);
        let header_name = gtk::Label::new(None);
        header_name.add_css_class("heading");
        header_name.set_hexpand(true);
        header_name.set_halign(gtk::Align::Start);
        let header_phone = gtk::Label::new(None);
        header_phone.add_css_class("dim-label");
        header.append(&header_name);
        header.append(&header_phone);
        chat_box.append(&header);

        let scroller = gtk::ScrolledWindow::builder()
            .vexpand(true)
            .hexpand(true)
            .build();
        let messages_box = gtk::Box::new(gtk::Orientation::Vertical, 6);
        scroller.set_child(Some(&messages_box));
        chat_box.append(&scroller);

        let input_row = gtk::Box::new(gtk::Orientation::Horizontal, 6);
        let entry = gtk::Entry::new();
        entry.set_hexpand(true);
        entry.set_placeholder_text(Some("Type your message..."));
        let send_btn = gtk::Button::with_label("Send");
        send_btn.add_css_class("suggested-action");
        input_row.append(&entry);
        input_row.append(&send_btn);
        chat_box.append(&input_row);

        chat_stack.add_named(&chat_box, Some("lead"));
        root.append(&chat_stack);

        Self {
            root,
            details_stack,
            details,
            chat_stack,
            header_name,
            header_phone,
            scroller,
            messages_box,
            entry,
            send_btn,
        }
    }

    pub fn widget(&self) -> gtk::Widget {
        self.root.clone().upcast()
    }

    /// `f` gets the raw input and returns whether it was accepted; accepted input is cleared.
    pub fn connect_send<F: Fn(&str) -> bool + 'static>(&self, f: F) {
        let entry = self.entry.clone();
        let send: Rc<dyn Fn()> = Rc::new(move || {
            let text = entry.text().to_string();
            if f(&text) {
                entry.set_text("");
            }
        });
        {
            let send = send.clone();
            self.send_btn.connect_clicked(move |_| (send)());
        }
        self.entry.connect_activate(move |_| (send)());
    }

    pub fn render(&self, chat: &ChatSession) {
        let Some(lead) = chat.lead() else {
            self.details_stack.set_visible_child_name("empty");
            self.chat_stack.set_visible_child_name("empty");
            return;
        };
        self.details.fill(lead);
        self.header_name.set_label(&lead.name);
        self.header_phone.set_label(&lead.phone);
        self.details_stack.set_visible_child_name("lead");
        self.chat_stack.set_visible_child_name("lead");

        while let Some(child) = self.messages_box.first_child() {
            self.messages_box.remove(&child);
        }
        if chat.transcript().is_empty() {
            self.messages_box
                .append(&placeholder("No messages yet. Start the conversation!"));
            return;
        }
        for msg in chat.transcript() {
            let bubble = gtk::Box::new(gtk::Orientation::Vertical, 2);
            bubble.add_css_class("card");
            let align = match msg.sender {
                Sender::Operator => gtk::Align::End,
                Sender::Counterparty => gtk::Align::Start,
            };
            bubble.set_halign(align);
            let text = gtk::Label::new(Some(&msg.text));
            text.set_wrap(true);
            text.set_margin_start(8);
            text.set_margin_end(8);
            text.set_margin_top(4);
            let time = gtk::Label::new(Some(&msg.timestamp));
            time.add_css_class("caption");
            time.add_css_class("dim-label");
            time.set_halign(gtk::Align::End);
            time.set_margin_end(8);
            time.set_margin_bottom(4);
            bubble.append(&text);
            bubble.append(&time);
            self.messages_box.append(&bubble);
        }
        let adj = self.scroller.vadjustment();
        adj.set_value(adj.upper());
    }
}

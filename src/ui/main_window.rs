use std::cell::RefCell;
use std::rc::Rc;

use adw::Application;
use adw::prelude::*;
use whatzapp::api::client::GatewayClient;
use whatzapp::browser::{LeadBrowser, Tab};
use whatzapp::chat::{self, ChatSession};
use whatzapp::error::ClientError;

use crate::ui::chat_view::ChatView;
use crate::ui::lead_table::LeadTable;

const CRM_PAGE: &str = "crm";
const MESSAGING_PAGE: &str = "messaging";

/// Glue between the widgets and the lead/chat state. Main thread only.
#[derive(Clone)]
struct Controller {
    client: GatewayClient,
    browser: Rc<RefCell<LeadBrowser>>,
    chat: Rc<RefCell<ChatSession>>,
    table: Rc<LeadTable>,
    chat_view: Rc<ChatView>,
    stack: gtk4::Stack,
    overlay: adw::ToastOverlay,
}

impl Controller {
    fn on_tab(&self, tab: Tab) {
        let fetch = self.browser.borrow_mut().activate(tab);
        if fetch {
            self.render_table();
            self.fetch_leads();
        }
    }

    fn fetch_leads(&self) {
        let client = self.client.clone();
        let rx = crate::runtime::run_to_main(async move {
            client.leads().await.map_err(|e| e.to_string())
        });
        let this = self.clone();
        rx.attach(None, move |res| {
            if let Err(err) = &res {
                log::error!("lead fetch failed: {err}");
            }
            this.browser.borrow_mut().finish_load(res);
            this.render_table();
            glib::ControlFlow::Continue
        });
    }

    fn render_table(&self) {
        let this = self.clone();
        let on_phone: Rc<dyn Fn(usize)> = Rc::new(move |row| this.open_chat(row));
        self.table.render(&self.browser.borrow(), on_phone);
    }

    fn open_chat(&self, row: usize) {
        let Some(lead) = self.browser.borrow_mut().open_chat(row) else {
            return;
        };
        self.chat.borrow_mut().select(lead);
        self.chat_view.render(&self.chat.borrow());
        self.stack.set_visible_child_name(MESSAGING_PAGE);
    }

    fn send(&self, input: &str) -> bool {
        let outgoing = self.chat.borrow_mut().compose(input);
        let Some(outgoing) = outgoing else {
            return false;
        };
        self.chat_view.render(&self.chat.borrow());

        let rx = crate::runtime::run_to_main(chat::deliver(self.client.clone(), outgoing));
        let overlay = self.overlay.clone();
        rx.attach(None, move |res: Result<(), ClientError>| {
            if let Err(err) = res {
                overlay.add_toast(adw::Toast::new(&format!("Message not delivered: {err}")));
            }
            glib::ControlFlow::Continue
        });
        true
    }
}

pub fn show_main_window(app: &Application, client: GatewayClient) {
    let window = adw::ApplicationWindow::builder()
        .application(app)
        .title("Whatzapp")
        .default_width(1100)
        .default_height(720)
        .build();

    let overlay = adw::ToastOverlay::new();
    let table = Rc::new(LeadTable::new());
    let chat_view = Rc::new(ChatView::new());

    let stack = gtk4::Stack::new();
    stack.add_titled(&table.widget(), Some(CRM_PAGE), "CRM");
    stack.add_titled(&chat_view.widget(), Some(MESSAGING_PAGE), "WhatsApp");
    overlay.set_child(Some(&stack));

    let container = gtk4::Box::new(gtk4::Orientation::Vertical, 0);
    let header = adw::HeaderBar::new();
    let switcher = gtk4::StackSwitcher::new();
    switcher.set_stack(Some(&stack));
    header.set_title_widget(Some(&switcher));
    container.append(&header);
    container.append(&overlay);
    window.set_content(Some(&container));

    let controller = Controller {
        client,
        browser: Rc::new(RefCell::new(LeadBrowser::new())),
        chat: Rc::new(RefCell::new(ChatSession::new())),
        table: table.clone(),
        chat_view: chat_view.clone(),
        stack: stack.clone(),
        overlay,
    };
    chat_view.render(&controller.chat.borrow());

    {
        let c = controller.clone();
        stack.connect_visible_child_name_notify(move |stack| {
            let tab = match stack.visible_child_name().as_deref() {
                Some(MESSAGING_PAGE) => Tab::Messaging,
                _ => Tab::Crm,
            };
            c.on_tab(tab);
        });
    }
    {
        let c = controller.clone();
        table.connect_search(move |filter| {
            c.browser.borrow_mut().search(filter);
            c.render_table();
        });
    }
    {
        let c = controller.clone();
        table.connect_clear(move || {
            c.table.clear_entries();
            c.browser.borrow_mut().clear_filters();
            c.render_table();
        });
    }
    {
        let c = controller.clone();
        table.connect_view_mode(move |mode| {
            c.browser.borrow_mut().set_view_mode(mode);
            c.render_table();
        });
    }
    {
        let c = controller.clone();
        chat_view.connect_send(move |input| c.send(input));
    }

    window.present();
    controller.on_tab(Tab::Crm);
}

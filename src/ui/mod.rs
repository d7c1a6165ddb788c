pub mod chat_view;
pub mod lead_table;
pub mod main_window;

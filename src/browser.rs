//! State behind the CRM tab: tab selection, the lead fetch lifecycle, the
//! cached lead list and the filtered, capped view shown in the table.

use crate::api::models::Lead;

/// Most rows the table ever shows.
pub const DISPLAY_CAP: usize = 15;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tab {
    Crm,
    Messaging,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ViewMode {
    #[default]
    All,
    Recent,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadState {
    Idle,
    Loading,
    Loaded,
    Errored(String),
}

/// Four substring filters, ANDed. An empty field matches everything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LeadFilter {
    pub name: String,
    pub phone: String,
    pub company: String,
    pub email: String,
}

fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    needle.is_empty() || haystack.to_lowercase().contains(&needle.to_lowercase())
}

impl LeadFilter {
    pub fn is_empty(&self) -> bool {
        self.name.is_empty() && self.phone.is_empty() && self.company.is_empty() && self.email.is_empty()
    }

    pub fn matches(&self, lead: &Lead) -> bool {
        let email = self.email.is_empty()
            || lead
                .email
                .as_deref()
                .is_some_and(|e| contains_ignore_case(e, &self.email));
        contains_ignore_case(&lead.name, &self.name)
            && lead.phone.contains(self.phone.as_str())
            && contains_ignore_case(&lead.company, &self.company)
            && email
    }
}

/// What the table area should display.
#[derive(Debug, PartialEq, Eq)]
pub enum TableView<'a> {
    Loading,
    Error(&'a str),
    Empty,
    Rows(Vec<&'a Lead>),
}

#[derive(Debug)]
pub struct LeadBrowser {
    tab: Tab,
    load: LoadState,
    leads: Vec<Lead>,
    filter: LeadFilter,
    view_mode: ViewMode,
    visible: Vec<usize>,
}

impl Default for LeadBrowser {
    fn default() -> Self {
        Self::new()
    }
}

impl LeadBrowser {
    pub fn new() -> Self {
        Self {
            tab: Tab::Crm,
            load: LoadState::Idle,
            leads: Vec::new(),
            filter: LeadFilter::default(),
            view_mode: ViewMode::default(),
            visible: Vec::new(),
        }
    }

    pub fn tab(&self) -> Tab {
        self.tab
    }

    pub fn load_state(&self) -> &LoadState {
        &self.load
    }

    pub fn filter(&self) -> &LeadFilter {
        &self.filter
    }

    pub fn view_mode(&self) -> ViewMode {
        self.view_mode
    }

    /// Switches tab. Returns `true` when the caller should start a lead fetch:
    /// on entering the CRM tab (or its first activation) unless one is already in flight.
    pub fn activate(&mut self, tab: Tab) -> bool {
        let entering = tab == Tab::Crm && (self.tab != Tab::Crm || self.load == LoadState::Idle);
        self.tab = tab;
        if entering && self.load != LoadState::Loading {
            self.load = LoadState::Loading;
            return true;
        }
        false
    }

    pub fn finish_load(&mut self, result: Result<Vec<Lead>, String>) {
        match result {
            Ok(leads) => {
                self.leads = leads;
                self.load = LoadState::Loaded;
                self.refresh();
            }
            Err(message) => self.load = LoadState::Errored(message),
        }
    }

    /// Applies `filter` to the cached leads.
    pub fn search(&mut self, filter: LeadFilter) {
        self.filter = filter;
        self.refresh();
    }

    pub fn clear_filters(&mut self) {
        self.filter = LeadFilter::default();
        self.refresh();
    }

    pub fn set_view_mode(&mut self, mode: ViewMode) {
        self.view_mode = mode;
        self.refresh();
    }

    fn refresh(&mut self) {
        // Leads carry no recency field, so Recent and All share the same cap.
        let filter = &self.filter;
        self.visible = self
            .leads
            .iter()
            .enumerate()
            .filter(|(_, lead)| filter.matches(lead))
            .map(|(idx, _)| idx)
            .take(DISPLAY_CAP)
            .collect();
    }

    pub fn visible(&self) -> Vec<&Lead> {
        self.visible.iter().map(|&idx| &self.leads[idx]).collect()
    }

    pub fn total(&self) -> usize {
        self.leads.len()
    }

    pub fn summary(&self) -> String {
        format!("Showing {} out of {} leads", self.visible.len(), self.total())
    }

    pub fn view(&self) -> TableView<'_> {
        match &self.load {
            LoadState::Loading => TableView::Loading,
            LoadState::Errored(message) => TableView::Error(message),
            LoadState::Idle | LoadState::Loaded if self.visible.is_empty() => TableView::Empty,
            LoadState::Idle | LoadState::Loaded => TableView::Rows(self.visible()),
        }
    }

    /// Phone click on a visible row: moves to the Messaging tab carrying that lead.
    pub fn open_chat(&mut self, row: usize) -> Option<Lead> {
        let lead = self.leads.get(*self.visible.get(row)?)?.clone();
        self.tab = Tab::Messaging;
        Some(lead)
    }
}

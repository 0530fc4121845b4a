//! Viewer state machine.
//!
//! Every external trigger is an [`Event`]; [`Controller::dispatch`] updates
//! the state and returns the [`Command`]s the host must carry out (render,
//! persist, fetch). The controller never performs I/O itself.
//!
//! Allow-list fetches are tagged with a ticket. Only the response for the
//! most recent request is applied, so a slow response can never overwrite a
//! newer selection.

use std::sync::Arc;

use crate::allow_list::AllowList;
use crate::features::FeatureCollection;
use crate::filter::{apply_filters, BrandFilter, CodeFilter, FilterState};
use crate::persist::{PersistedState, ViewState, SELECTED_BRAND_KEY, SELECTED_CODE_FILTER_KEY};

pub type Ticket = u64;

#[derive(Debug, Clone)]
pub enum Event {
    DataLoaded(Arc<FeatureCollection>),
    BrandChanged(BrandFilter),
    CodeFilterChanged(CodeFilter),
    AllowListLoaded {
        ticket: Ticket,
        list_id: String,
        result: Result<AllowList, String>,
    },
    ViewMoved(ViewState),
}

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// Replace the rendered dataset.
    Render(FeatureCollection),
    Persist { key: &'static str, value: String },
    FetchAllowList { ticket: Ticket, list_id: String },
    /// Message for the viewer.
    Notify(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingList {
    pub ticket: Ticket,
    pub list_id: String,
}

#[derive(Debug, Default)]
pub struct Controller {
    canonical: Option<Arc<FeatureCollection>>,
    /// Filters currently reflected in the rendered set.
    filters: FilterState,
    /// Invariant: `Some` with a matching id exactly when `filters.codes` is a list.
    allow_list: Option<AllowList>,
    pending: Option<PendingList>,
    view: ViewState,
    last_ticket: Ticket,
}

impl Controller {
    /// Start from persisted state.
    ///
    /// The persisted brand applies immediately. A persisted code list is not
    /// active until it has been fetched: the returned commands request it.
    #[must_use]
    pub fn restore(state: &PersistedState) -> (Self, Vec<Command>) {
        let mut controller = Self {
            view: state.view,
            filters: FilterState {
                brand: state.filters.brand.clone(),
                codes: CodeFilter::All,
            },
            ..Self::default()
        };
        let commands = match &state.filters.codes {
            CodeFilter::All => Vec::new(),
            CodeFilter::List(id) => vec![controller.request_list(id.clone())],
        };
        (controller, commands)
    }

    #[must_use]
    pub fn filters(&self) -> &FilterState {
        &self.filters
    }

    #[must_use]
    pub fn view(&self) -> ViewState {
        self.view
    }

    #[must_use]
    pub fn pending(&self) -> Option<&PendingList> {
        self.pending.as_ref()
    }

    #[must_use]
    pub fn canonical(&self) -> Option<&Arc<FeatureCollection>> {
        self.canonical.as_ref()
    }

    pub fn dispatch(&mut self, event: Event) -> Vec<Command> {
        match event {
            Event::DataLoaded(collection) => {
                tracing::info!(features = collection.len(), "store data loaded");
                self.canonical = Some(collection);
                self.render().into_iter().collect()
            }
            Event::BrandChanged(brand) => {
                let mut commands = vec![Command::Persist {
                    key: SELECTED_BRAND_KEY,
                    value: brand.as_selector().to_string(),
                }];
                self.filters.brand = brand;
                commands.extend(self.render());
                commands
            }
            Event::CodeFilterChanged(CodeFilter::All) => {
                // Also cancels any list still in flight.
                self.pending = None;
                self.allow_list = None;
                self.filters.codes = CodeFilter::All;
                let mut commands = vec![Command::Persist {
                    key: SELECTED_CODE_FILTER_KEY,
                    value: CodeFilter::All.as_selector().to_string(),
                }];
                commands.extend(self.render());
                commands
            }
            Event::CodeFilterChanged(CodeFilter::List(list_id)) => {
                vec![
                    Command::Persist {
                        key: SELECTED_CODE_FILTER_KEY,
                        value: list_id.clone(),
                    },
                    self.request_list(list_id),
                ]
            }
            Event::AllowListLoaded {
                ticket,
                list_id,
                result,
            } => self.on_allow_list(ticket, list_id, result),
            Event::ViewMoved(view) => {
                if !view.is_valid() {
                    tracing::warn!(?view, "ignoring non-finite view change");
                    return Vec::new();
                }
                self.view = view;
                match view.entries() {
                    Ok(entries) => entries
                        .into_iter()
                        .map(|(key, value)| Command::Persist { key, value })
                        .collect(),
                    Err(e) => {
                        tracing::error!(error = %e, "failed to encode view state");
                        Vec::new()
                    }
                }
            }
        }
    }

    fn request_list(&mut self, list_id: String) -> Command {
        self.last_ticket += 1;
        let ticket = self.last_ticket;
        tracing::debug!(ticket, list = %list_id, "requesting allow-list");
        self.pending = Some(PendingList {
            ticket,
            list_id: list_id.clone(),
        });
        Command::FetchAllowList { ticket, list_id }
    }

    fn on_allow_list(
        &mut self,
        ticket: Ticket,
        list_id: String,
        result: Result<AllowList, String>,
    ) -> Vec<Command> {
        let is_current = self
            .pending
            .as_ref()
            .is_some_and(|p| p.ticket == ticket && p.list_id == list_id);
        if !is_current {
            tracing::debug!(ticket, list = %list_id, "dropping stale allow-list response");
            return Vec::new();
        }
        self.pending = None;

        match result {
            Ok(list) if list.id() == list_id => {
                tracing::info!(list = %list_id, codes = list.len(), "applying allow-list");
                self.filters.codes = CodeFilter::List(list_id);
                self.allow_list = Some(list);
                self.render().into_iter().collect()
            }
            Ok(list) => {
                tracing::error!(expected = %list_id, actual = %list.id(), "allow-list id mismatch");
                vec![Command::Notify(format!(
                    "store list \"{list_id}\" could not be applied"
                ))]
            }
            Err(reason) => {
                tracing::warn!(
                    list = %list_id,
                    %reason,
                    "allow-list unavailable; keeping current view"
                );
                vec![Command::Notify(format!(
                    "store list \"{list_id}\" could not be loaded: {reason}"
                ))]
            }
        }
    }

    fn render(&self) -> Option<Command> {
        let canonical = self.canonical.as_ref()?;
        match apply_filters(canonical, &self.filters, self.allow_list.as_ref()) {
            Ok(visible) => {
                tracing::debug!(
                    visible = visible.len(),
                    total = canonical.len(),
                    brand = self.filters.brand.as_selector(),
                    codes = self.filters.codes.as_selector(),
                    "recomputed visible stores"
                );
                Some(Command::Render(visible))
            }
            Err(e) => {
                tracing::error!(error = %e, "filter state inconsistent; render skipped");
                None
            }
        }
    }
}

#[cfg(test)]
#[path = "controller_test.rs"]
mod tests;

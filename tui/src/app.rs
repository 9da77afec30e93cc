//! Event loop: crossterm key events in, intents out, frames drawn whenever
//! the session publishes a new display state.

use color_eyre::Result;
use crossterm::event::Event;
use crossterm::event::EventStream;
use crossterm::event::KeyCode;
use crossterm::event::KeyEvent;
use crossterm::event::KeyEventKind;
use crossterm::event::KeyModifiers;
use futures::StreamExt;
use paperdeck_core::Intent;
use paperdeck_core::ProviderSet;
use paperdeck_core::SessionHandle;
use paperdeck_core::TopicCatalog;
use paperdeck_core::TopicFilter;
use ratatui::DefaultTerminal;
use tokio::sync::watch;
use tracing::debug;

use crate::view;

pub struct App {
    session: SessionHandle,
    state_rx: watch::Receiver<paperdeck_core::DisplayState>,
    /// Selector options in display order; index 0 is the `All` sentinel.
    topic_options: Vec<TopicFilter>,
    topic_index: usize,
    /// Local echo of the search box; the authoritative term lives in the
    /// session state.
    input: String,
    selected_row: usize,
}

impl App {
    pub fn new(collection_path: String, providers: ProviderSet, catalog: TopicCatalog) -> Self {
        let session = SessionHandle::spawn(collection_path, providers);
        let state_rx = session.state();
        let topic_options = catalog.selector_options();
        Self {
            session,
            state_rx,
            topic_options,
            topic_index: 0,
            input: String::new(),
            selected_row: 0,
        }
    }

    pub async fn run(mut self, mut terminal: DefaultTerminal) -> Result<()> {
        let mut events = EventStream::new();
        // A local receiver keeps the select arms from borrowing `self`.
        let mut state_rx = self.state_rx.clone();
        loop {
            let state = state_rx.borrow_and_update().clone();
            self.selected_row = self
                .selected_row
                .min(state.active_list.len().saturating_sub(1));
            terminal.draw(|frame| {
                view::draw(
                    frame,
                    &state,
                    &self.topic_options,
                    self.topic_index,
                    self.selected_row,
                );
            })?;

            tokio::select! {
                changed = state_rx.changed() => {
                    if changed.is_err() {
                        break;
                    }
                }
                maybe_event = events.next() => match maybe_event {
                    Some(Ok(Event::Key(key))) if key.kind != KeyEventKind::Release => {
                        if self.handle_key(key) {
                            break;
                        }
                    }
                    Some(Ok(_)) => {}
                    Some(Err(_)) | None => break,
                },
            }
        }
        self.session.shutdown().await;
        Ok(())
    }

    /// Returns true when the app should exit.
    fn handle_key(&mut self, key: KeyEvent) -> bool {
        match (key.modifiers, key.code) {
            (KeyModifiers::CONTROL, KeyCode::Char('c')) => return true,
            (_, KeyCode::Esc) => {
                debug!("clearing filters");
                self.input.clear();
                self.topic_index = 0;
                self.selected_row = 0;
                self.session.send(Intent::ClearFilters);
            }
            (_, KeyCode::Tab) => self.cycle_topic(1),
            (_, KeyCode::BackTab) => self.cycle_topic(-1),
            (_, KeyCode::Up) => self.selected_row = self.selected_row.saturating_sub(1),
            (_, KeyCode::Down) => self.selected_row = self.selected_row.saturating_add(1),
            (_, KeyCode::Backspace) => {
                self.input.pop();
                self.session.send(Intent::SearchTermChanged(self.input.clone()));
            }
            (modifiers, KeyCode::Char(c))
                if modifiers.is_empty() || modifiers == KeyModifiers::SHIFT =>
            {
                self.input.push(c);
                self.session.send(Intent::SearchTermChanged(self.input.clone()));
            }
            _ => {}
        }
        false
    }

    fn cycle_topic(&mut self, step: isize) {
        let count = self.topic_options.len() as isize;
        if count == 0 {
            return;
        }
        let index = (self.topic_index as isize + step).rem_euclid(count) as usize;
        self.topic_index = index;
        self.selected_row = 0;
        self.session
            .send(Intent::TopicSelected(self.topic_options[index].clone()));
    }
}

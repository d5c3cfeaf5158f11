use anyhow::Result;
use tokio::task::JoinHandle;

use crate::backend::BackendClient;
use crate::session::{self, ResponseEnvelope, Session, Turn};

pub struct App {
    pub should_quit: bool,
    pub session: Session,
    pub input_cursor: usize, // cursor position in the draft, in chars

    // Chat viewport state (updated during render)
    pub chat_scroll: u16,
    pub chat_height: u16,
    pub chat_width: u16,

    // Citation lists start collapsed; Ctrl+S expands them
    pub show_sources: bool,

    // 0-2 for the thinking ellipsis animation
    pub animation_frame: u8,

    backend: BackendClient,
    request_task: Option<JoinHandle<Result<ResponseEnvelope>>>,
}

impl App {
    pub fn new(backend: BackendClient) -> Self {
        Self {
            should_quit: false,
            session: Session::new(),
            input_cursor: 0,

            chat_scroll: 0,
            chat_height: 0,
            chat_width: 0,

            show_sources: false,
            animation_frame: 0,

            backend,
            request_task: None,
        }
    }

    /// Kick off one submission from the draft. The session guard decides
    /// whether anything happens; when it passes, exactly one request task
    /// is spawned with the bound applied around the transport call.
    pub fn submit(&mut self) {
        let Some(query) = self.session.submit() else {
            return;
        };
        self.input_cursor = 0;
        tracing::debug!(%query, "submitting question");

        let client = self.backend.clone();
        self.request_task = Some(tokio::spawn(async move {
            session::complete_call(client.ask(&query)).await
        }));

        self.scroll_chat_to_bottom();
    }

    /// Reap the request task once it finishes and fold the outcome into the
    /// log. Called from the tick event, so the UI stays live in between.
    pub async fn poll_request(&mut self) {
        let finished = self
            .request_task
            .as_ref()
            .is_some_and(|task| task.is_finished());
        if !finished {
            return;
        }

        if let Some(task) = self.request_task.take() {
            let outcome = match task.await {
                Ok(outcome) => outcome,
                Err(err) => Err(anyhow::anyhow!("request task failed: {err}")),
            };
            self.session.resolve(outcome);
            self.scroll_chat_to_bottom();
        }
    }

    pub fn tick_animation(&mut self) {
        if self.session.pending() {
            self.animation_frame = (self.animation_frame + 1) % 3;
        }
    }

    // Chat scrolling

    pub fn scroll_chat_up(&mut self) {
        self.chat_scroll = self.chat_scroll.saturating_sub(1);
    }

    pub fn scroll_chat_down(&mut self) {
        let max = self.chat_total_lines().saturating_sub(self.chat_height);
        if self.chat_scroll < max {
            self.chat_scroll += 1;
        }
    }

    pub fn scroll_chat_half_page_up(&mut self) {
        self.chat_scroll = self.chat_scroll.saturating_sub(self.chat_height / 2);
    }

    pub fn scroll_chat_half_page_down(&mut self) {
        let max = self.chat_total_lines().saturating_sub(self.chat_height);
        self.chat_scroll = (self.chat_scroll + self.chat_height / 2).min(max);
    }

    /// Keep the newest turn (or the thinking line) visible.
    pub fn scroll_chat_to_bottom(&mut self) {
        let total = self.chat_total_lines();
        let visible = if self.chat_height > 0 {
            self.chat_height
        } else {
            20
        };
        self.chat_scroll = total.saturating_sub(visible);
    }

    /// Estimate of the rendered chat height, mirroring what the renderer
    /// emits per turn. Wrapping uses character counts for UTF-8 safety.
    fn chat_total_lines(&self) -> u16 {
        let wrap_width = if self.chat_width > 0 {
            self.chat_width as usize
        } else {
            50
        };

        let mut total: u16 = 0;
        for turn in &self.session.log {
            total += Self::turn_lines(turn, wrap_width, self.show_sources);
        }
        if self.session.pending() {
            total += 2; // "AI:" + thinking line
        }
        total
    }

    fn turn_lines(turn: &Turn, wrap_width: usize, show_sources: bool) -> u16 {
        let mut lines = 1; // role line
        match turn {
            Turn::User(text) => {
                lines += Self::wrapped_lines(text, wrap_width);
            }
            Turn::Assistant(envelope) => {
                lines += Self::wrapped_lines(envelope.answer_text(), wrap_width);
                if envelope.intents.as_ref().is_some_and(|i| !i.is_empty()) {
                    lines += 1;
                }
                if envelope.latency_ms.is_some() {
                    lines += 1;
                }
                if let Some(sources) = envelope.sources.as_ref().filter(|s| !s.is_empty()) {
                    lines += 1; // "Sources (n)" header
                    if show_sources {
                        lines += sources.len() as u16;
                    }
                }
            }
        }
        lines + 1 // blank line after each turn
    }

    fn wrapped_lines(text: &str, wrap_width: usize) -> u16 {
        let mut lines: u16 = 0;
        for line in text.lines() {
            let char_count = line.chars().count();
            if char_count == 0 {
                lines += 1;
            } else {
                lines += (char_count / wrap_width + 1) as u16;
            }
        }
        lines
    }
}

use anyhow::Result;
use crossterm::event::KeyEvent;
use std::time::{Duration, Instant};

use tid_store::config::UiSettings;
use tid_store::Gateway;

use crate::log_gateway_call;
use crate::logging::LogConfig;

pub mod state;
pub use state::*;
pub mod handlers;

impl App {
    pub fn new(gateway: Gateway, ui: &UiSettings) -> Self {
        Self {
            running: true,
            current_tab: Tab::Create,
            show_help: false,
            gateway,
            form: FormState::new(),
            posts_state: PostsState::default(),
            stats_state: StatsState::default(),
            status: None,
            status_timeout: ui.status_timeout(),
            refresh_interval: ui.refresh_interval(),
            last_refresh: None,
            log_config: LogConfig::default(),
        }
    }

    pub fn handle_key_event(&mut self, key: KeyEvent) -> Result<()> {
        handlers::handle_key_event(self, key)
    }

    pub fn quit(&mut self) {
        self.running = false;
    }

    pub fn toggle_help(&mut self) {
        self.show_help = !self.show_help;
    }

    pub fn next_tab(&mut self) {
        self.current_tab = self.current_tab.next();
    }

    pub fn previous_tab(&mut self) {
        self.current_tab = self.current_tab.previous();
    }

    pub fn select_tab(&mut self, tab: Tab) {
        self.current_tab = tab;
    }

    pub fn set_success(&mut self, text: impl Into<String>) {
        self.set_status(StatusKind::Success, text.into());
    }

    pub fn set_error(&mut self, text: impl Into<String>) {
        self.set_status(StatusKind::Error, text.into());
    }

    fn set_status(&mut self, kind: StatusKind, text: String) {
        self.status = Some(StatusMessage {
            kind,
            text,
            shown_at: Instant::now(),
        });
    }

    /// Clear the status line once it has been visible for `status_timeout`
    pub fn clear_expired_status(&mut self, now: Instant) {
        if let Some(status) = &self.status {
            if status.is_expired(now, self.status_timeout) {
                self.status = None;
            }
        }
    }

    pub fn load_posts(&mut self) {
        log_gateway_call!(self.log_config, "list_posts");
        match self.gateway.list_posts() {
            Ok(posts) => self.posts_state.set_posts(posts),
            Err(e) => {
                log::error!("Failed to load posts: {}", e);
                self.posts_state.error = Some(e.to_string());
            }
        }
    }

    pub fn load_stats(&mut self) {
        log_gateway_call!(self.log_config, "list_stats");
        match self.gateway.list_stats() {
            Ok(stats) => self.stats_state.set_stats(stats),
            Err(e) => {
                log::error!("Failed to load stats: {}", e);
                self.stats_state.error = Some(e.to_string());
            }
        }
    }

    /// Re-read both tables and restart the refresh timer
    pub fn refresh_all(&mut self, now: Instant) {
        self.load_posts();
        self.load_stats();
        self.last_refresh = Some(now);
    }

    /// Refresh when the timer has run out. Returns true if it did.
    pub fn refresh_if_due(&mut self, now: Instant) -> bool {
        let due = match self.last_refresh {
            None => true,
            Some(last) => now.duration_since(last) >= self.refresh_interval,
        };
        if due {
            log::debug!("Periodic refresh");
            self.refresh_all(now);
        }
        due
    }

    /// Time left until the next periodic refresh
    pub fn until_refresh(&self, now: Instant) -> Duration {
        self.last_refresh
            .map(|last| self.refresh_interval.saturating_sub(now.duration_since(last)))
            .unwrap_or_default()
    }

    /// Hand the form to the gateway. The form is cleared only on success.
    pub fn submit_form(&mut self) {
        let post = self.form.to_new_post();
        log_gateway_call!(
            self.log_config,
            "create_post name={:?} days={} times={} media={}",
            post.name,
            post.week_days.len(),
            post.times.len(),
            post.media_paths.len()
        );

        match self.gateway.create_post(&post) {
            Ok(created) => {
                self.form.clear();
                if created.is_complete() {
                    self.set_success("Done");
                } else {
                    for item in &created.skipped {
                        log::warn!("Post {} created without {}", created.id, item);
                    }
                    self.set_success(format!("Done ({} skipped)", created.skipped.len()));
                }
                self.load_posts();
            }
            Err(e) => {
                log::error!("Failed to create post: {}", e);
                self.set_error(format!("Error: {}", e));
            }
        }
    }

    /// Delete the post selected in the posts table
    pub fn delete_selected_post(&mut self) {
        let Some(id) = self.posts_state.selected_post().map(|post| post.id) else {
            return;
        };
        log_gateway_call!(self.log_config, "delete_post id={}", id);

        match self.gateway.delete_post(id) {
            Ok(()) => {
                self.posts_state.remove_post(id);
                // Stats rows go with the post
                self.load_stats();
                self.set_success(format!("Deleted post {}", id));
            }
            Err(e) => {
                log::error!("Failed to delete post {}: {}", id, e);
                self.set_error(format!("Error: {}", e));
            }
        }
    }
}

#[cfg(test)]
mod tests;

use std::path::PathBuf;
use std::time::{Duration, Instant};

use ratatui::widgets::TableState;
use tid_store::Gateway;
use tid_types::{NewPost, PostView, StatView, WeekDay};
use tui_textarea::TextArea;

use crate::logging::LogConfig;

/// Minute picker granularity; matches the seeded time slots
pub const MINUTE_STEP: u32 = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tab {
    Create,
    Posts,
    Stats,
}

impl Tab {
    pub const ALL: [Tab; 3] = [Tab::Create, Tab::Posts, Tab::Stats];

    pub fn next(&self) -> Self {
        match self {
            Tab::Create => Tab::Posts,
            Tab::Posts => Tab::Stats,
            Tab::Stats => Tab::Create,
        }
    }

    pub fn previous(&self) -> Self {
        match self {
            Tab::Create => Tab::Stats,
            Tab::Posts => Tab::Create,
            Tab::Stats => Tab::Posts,
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            Tab::Create => "Create",
            Tab::Posts => "Posts",
            Tab::Stats => "Stats",
        }
    }

    /// Tab bound to a number key (`1`..`3`)
    pub fn from_digit(c: char) -> Option<Self> {
        match c {
            '1' => Some(Tab::Create),
            '2' => Some(Tab::Posts),
            '3' => Some(Tab::Stats),
            _ => None,
        }
    }
}

/// Focusable fields of the create form, top to bottom
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormField {
    Name,
    Text,
    MediaPath,
    MediaList,
    Random,
    WeekDays,
    Hour,
    Minute,
    Times,
    Submit,
}

impl FormField {
    const ORDER: [FormField; 10] = [
        FormField::Name,
        FormField::Text,
        FormField::MediaPath,
        FormField::MediaList,
        FormField::Random,
        FormField::WeekDays,
        FormField::Hour,
        FormField::Minute,
        FormField::Times,
        FormField::Submit,
    ];

    fn position(&self) -> usize {
        Self::ORDER.iter().position(|f| f == self).unwrap_or(0)
    }

    pub fn next(&self) -> Self {
        Self::ORDER[(self.position() + 1) % Self::ORDER.len()]
    }

    pub fn previous(&self) -> Self {
        let len = Self::ORDER.len();
        Self::ORDER[(self.position() + len - 1) % len]
    }

    /// Fields that take typed text; single-key shortcuts are off while focused
    pub fn is_text(&self) -> bool {
        matches!(self, FormField::Name | FormField::Text | FormField::MediaPath)
    }
}

/// Transient state of the create form
pub struct FormState {
    pub focus: FormField,
    pub name: TextArea<'static>,
    pub text: TextArea<'static>,
    pub media_input: TextArea<'static>,
    pub media_paths: Vec<PathBuf>,
    pub media_selected: usize,
    pub is_random: bool,
    /// Checkbox per day, Monday first
    pub week_days: [bool; 7],
    pub day_cursor: usize,
    pub hour: u32,
    pub minute: u32,
    /// `HH:MM`, kept sorted and unique
    pub times: Vec<String>,
    pub time_selected: usize,
}

impl Default for FormState {
    fn default() -> Self {
        Self::new()
    }
}

impl FormState {
    pub fn new() -> Self {
        Self {
            focus: FormField::Name,
            name: TextArea::default(),
            text: TextArea::default(),
            media_input: TextArea::default(),
            media_paths: Vec::new(),
            media_selected: 0,
            is_random: false,
            week_days: [false; 7],
            day_cursor: 0,
            hour: 0,
            minute: 0,
            times: Vec::new(),
            time_selected: 0,
        }
    }

    pub fn clear(&mut self) {
        *self = Self::new();
    }

    pub fn name_value(&self) -> String {
        self.name.lines().join(" ").trim().to_string()
    }

    pub fn text_value(&self) -> String {
        self.text.lines().join("\n")
    }

    pub fn focused_textarea(&mut self) -> Option<&mut TextArea<'static>> {
        match self.focus {
            FormField::Name => Some(&mut self.name),
            FormField::Text => Some(&mut self.text),
            FormField::MediaPath => Some(&mut self.media_input),
            _ => None,
        }
    }

    /// True once the focused text field holds text. Until then digit keys
    /// switch tabs instead of typing.
    pub fn is_typing(&self) -> bool {
        let area = match self.focus {
            FormField::Name => &self.name,
            FormField::Text => &self.text,
            FormField::MediaPath => &self.media_input,
            _ => return false,
        };
        area.lines().iter().any(|line| !line.is_empty())
    }

    pub fn picked_time(&self) -> String {
        format!("{:02}:{:02}", self.hour, self.minute)
    }

    pub fn hour_up(&mut self) {
        self.hour = (self.hour + 1) % 24;
    }

    pub fn hour_down(&mut self) {
        self.hour = (self.hour + 23) % 24;
    }

    pub fn minute_up(&mut self) {
        self.minute = (self.minute + MINUTE_STEP) % 60;
    }

    pub fn minute_down(&mut self) {
        self.minute = (self.minute + 60 - MINUTE_STEP) % 60;
    }

    /// Add the picked time. Returns false if it is already listed.
    pub fn add_time(&mut self) -> bool {
        let time = self.picked_time();
        if self.times.contains(&time) {
            return false;
        }
        self.times.push(time);
        self.times.sort();
        true
    }

    /// Remove `time` if listed. Returns false if it was not.
    pub fn remove_time(&mut self, time: &str) -> bool {
        match self.times.iter().position(|t| t == time) {
            Some(index) => {
                self.times.remove(index);
                self.time_selected = self.time_selected.min(self.times.len().saturating_sub(1));
                true
            }
            None => false,
        }
    }

    pub fn remove_selected_time(&mut self) -> bool {
        match self.times.get(self.time_selected).cloned() {
            Some(time) => self.remove_time(&time),
            None => false,
        }
    }

    /// Move the typed path into the media list. Empty and duplicate paths
    /// are ignored.
    pub fn add_media_path(&mut self) -> bool {
        let typed = self.media_input.lines().join("").trim().to_string();
        if typed.is_empty() {
            return false;
        }
        self.media_input = TextArea::default();
        let path = PathBuf::from(typed);
        if self.media_paths.contains(&path) {
            return false;
        }
        self.media_paths.push(path);
        true
    }

    pub fn remove_selected_media(&mut self) -> bool {
        if self.media_selected >= self.media_paths.len() {
            return false;
        }
        self.media_paths.remove(self.media_selected);
        self.media_selected = self.media_selected.min(self.media_paths.len().saturating_sub(1));
        true
    }

    pub fn toggle_day(&mut self, index: usize) {
        if let Some(checked) = self.week_days.get_mut(index) {
            *checked = !*checked;
        }
    }

    pub fn selected_days(&self) -> Vec<WeekDay> {
        WeekDay::ALL
            .iter()
            .zip(self.week_days.iter())
            .filter(|(_, checked)| **checked)
            .map(|(day, _)| *day)
            .collect()
    }

    pub fn to_new_post(&self) -> NewPost {
        NewPost {
            name: self.name_value(),
            text: self.text_value(),
            is_random: self.is_random,
            media_paths: self.media_paths.clone(),
            week_days: self
                .selected_days()
                .iter()
                .map(|day| day.as_str().to_string())
                .collect(),
            times: self.times.clone(),
        }
    }
}

/// Selection within a list, wrapping at both ends
fn step_selection(selected: Option<usize>, len: usize, forward: bool) -> Option<usize> {
    if len == 0 {
        return None;
    }
    Some(match selected {
        None => 0,
        Some(i) if forward => (i + 1) % len,
        Some(i) => (i + len - 1) % len,
    })
}

/// Posts tab state
#[derive(Default)]
pub struct PostsState {
    pub posts: Vec<PostView>,
    pub table_state: TableState,
    pub error: Option<String>,
}

impl PostsState {
    pub fn set_posts(&mut self, posts: Vec<PostView>) {
        self.posts = posts;
        self.error = None;
        self.clamp_selection();
    }

    pub fn selected_post(&self) -> Option<&PostView> {
        self.table_state.selected().and_then(|i| self.posts.get(i))
    }

    pub fn remove_post(&mut self, id: i64) {
        self.posts.retain(|post| post.id != id);
        self.clamp_selection();
    }

    pub fn select_next(&mut self) {
        let next = step_selection(self.table_state.selected(), self.posts.len(), true);
        self.table_state.select(next);
    }

    pub fn select_previous(&mut self) {
        let prev = step_selection(self.table_state.selected(), self.posts.len(), false);
        self.table_state.select(prev);
    }

    fn clamp_selection(&mut self) {
        let selected = match (self.table_state.selected(), self.posts.len()) {
            (_, 0) => None,
            (None, _) => Some(0),
            (Some(i), len) => Some(i.min(len - 1)),
        };
        self.table_state.select(selected);
    }
}

/// Stats tab state
#[derive(Default)]
pub struct StatsState {
    pub stats: Vec<StatView>,
    pub table_state: TableState,
    pub error: Option<String>,
}

impl StatsState {
    pub fn set_stats(&mut self, stats: Vec<StatView>) {
        let selected = match (self.table_state.selected(), stats.len()) {
            (_, 0) => None,
            (None, _) => Some(0),
            (Some(i), len) => Some(i.min(len - 1)),
        };
        self.stats = stats;
        self.error = None;
        self.table_state.select(selected);
    }

    pub fn select_next(&mut self) {
        let next = step_selection(self.table_state.selected(), self.stats.len(), true);
        self.table_state.select(next);
    }

    pub fn select_previous(&mut self) {
        let prev = step_selection(self.table_state.selected(), self.stats.len(), false);
        self.table_state.select(prev);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusKind {
    Success,
    Error,
}

/// One-line feedback shown under the tabs until it expires
#[derive(Debug, Clone)]
pub struct StatusMessage {
    pub kind: StatusKind,
    pub text: String,
    pub shown_at: Instant,
}

impl StatusMessage {
    pub fn is_expired(&self, now: Instant, timeout: Duration) -> bool {
        now.duration_since(self.shown_at) >= timeout
    }
}

pub struct App {
    pub running: bool,
    pub current_tab: Tab,
    pub show_help: bool,
    pub gateway: Gateway,
    pub form: FormState,
    pub posts_state: PostsState,
    pub stats_state: StatsState,
    pub status: Option<StatusMessage>,
    pub status_timeout: Duration,
    pub refresh_interval: Duration,
    pub last_refresh: Option<Instant>,
    pub log_config: LogConfig,
}

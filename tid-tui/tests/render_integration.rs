use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use ratatui::backend::TestBackend;
use ratatui::Terminal;
use std::time::Instant;

use tid::app::{App, Tab};
use tid::ui;
use tid_store::{Gateway, Settings};

fn press(app: &mut App, code: KeyCode) {
    let mut event = KeyEvent::new(code, KeyModifiers::empty());
    event.kind = KeyEventKind::Press;
    app.handle_key_event(event).expect("key handled");
}

fn screen_text(terminal: &Terminal<TestBackend>) -> String {
    terminal
        .backend()
        .buffer()
        .content()
        .iter()
        .map(|cell| cell.symbol())
        .collect()
}

fn file_backed_app(dir: &tempfile::TempDir) -> App {
    let mut settings = Settings::in_memory();
    settings.database.path = dir.path().join("tid.db").to_string_lossy().into_owned();
    let gateway = Gateway::connect(&settings).expect("gateway over a file database");
    App::new(gateway, &settings.ui)
}

#[test]
fn test_create_then_view_in_posts_tab() {
    let dir = tempfile::tempdir().unwrap();
    let mut app = file_backed_app(&dir);
    let mut terminal = Terminal::new(TestBackend::new(120, 40)).unwrap();
    app.refresh_if_due(Instant::now());

    for c in "Launch notes".chars() {
        press(&mut app, KeyCode::Char(c));
    }
    press(&mut app, KeyCode::Enter);
    for c in "Shipping today".chars() {
        press(&mut app, KeyCode::Char(c));
    }
    app.form.week_days[2] = true;
    app.form.hour = 12;
    app.form.add_time();
    app.form.focus = tid::app::FormField::Submit;

    terminal.draw(|frame| ui::render(&mut app, frame)).unwrap();
    let form_screen = screen_text(&terminal);
    assert!(form_screen.contains("Launch notes"));
    assert!(form_screen.contains("12:00"));

    press(&mut app, KeyCode::Enter);
    terminal.draw(|frame| ui::render(&mut app, frame)).unwrap();
    assert!(screen_text(&terminal).contains("Done"));

    press(&mut app, KeyCode::Char('2'));
    assert_eq!(app.current_tab, Tab::Posts);
    terminal.draw(|frame| ui::render(&mut app, frame)).unwrap();
    let posts_screen = screen_text(&terminal);
    assert!(posts_screen.contains("Launch notes"));
    assert!(posts_screen.contains("Wednesday"));
    assert!(posts_screen.contains("Week Days"));
}

#[test]
fn test_posts_survive_a_restart() {
    let dir = tempfile::tempdir().unwrap();
    {
        let mut app = file_backed_app(&dir);
        app.form.name.insert_str("Persistent");
        app.submit_form();
    }

    let mut app = file_backed_app(&dir);
    app.refresh_all(Instant::now());
    assert_eq!(app.posts_state.posts.len(), 1);
    assert_eq!(app.posts_state.posts[0].name, "Persistent");
}

#[test]
fn test_small_terminal_shows_warning() {
    let dir = tempfile::tempdir().unwrap();
    let mut app = file_backed_app(&dir);
    let mut terminal = Terminal::new(TestBackend::new(40, 10)).unwrap();

    terminal.draw(|frame| ui::render(&mut app, frame)).unwrap();
    assert!(screen_text(&terminal).contains("Terminal Too Small"));
}

#[test]
fn test_help_overlay_and_empty_stats() {
    let dir = tempfile::tempdir().unwrap();
    let mut app = file_backed_app(&dir);
    app.refresh_all(Instant::now());
    let mut terminal = Terminal::new(TestBackend::new(100, 30)).unwrap();

    press(&mut app, KeyCode::Char('3'));
    terminal.draw(|frame| ui::render(&mut app, frame)).unwrap();
    assert!(screen_text(&terminal).contains("No runs recorded yet."));

    press(&mut app, KeyCode::Char('?'));
    terminal.draw(|frame| ui::render(&mut app, frame)).unwrap();
    assert!(screen_text(&terminal).contains("Keyboard Shortcuts"));
}

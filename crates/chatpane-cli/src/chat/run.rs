use std::io;
use std::time::Duration;

use anyhow::Result;
use chatpane_core::{ChatWidget, Completion, WidgetConfig};
use crossterm::{
    event::{self, Event, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::info;

use super::app::{App, Flow};
use super::keys::map_key;
use super::render::render;

// ── main entry ───────────────────────────────────────────────────────────────

pub async fn run(widget: ChatWidget, config: &WidgetConfig) -> Result<()> {
    // Always restore the terminal, even on panic.
    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
        original_hook(info);
    }));

    enable_raw_mode()?;
    execute!(io::stdout(), EnterAlternateScreen)?;
    let mut terminal = Terminal::new(CrosstermBackend::new(io::stdout()))?;
    terminal.clear()?;

    let result = event_loop(&mut terminal, App::new(widget, &config.model)).await;

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;
    result
}

async fn event_loop(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    mut app: App,
) -> Result<()> {
    let (key_tx, mut key_rx) = mpsc::channel::<Event>(32);
    let _reader = spawn_key_reader(key_tx);

    // At most one request is ever outstanding; its completion comes back here.
    let (done_tx, mut done_rx) = mpsc::channel::<Completion>(1);
    let mut request_task: Option<JoinHandle<()>> = None;
    let mut tick = tokio::time::interval(Duration::from_millis(80));

    loop {
        app.sync_scroll();
        terminal.draw(|f| render(&mut app, f))?;

        tokio::select! {
            key = key_rx.recv() => {
                let Some(ev) = key else { break };
                let Event::Key(key) = ev else { continue };
                if key.kind != KeyEventKind::Press { continue; }

                match app.apply(map_key(key)) {
                    Flow::Continue => {}
                    Flow::Quit => break,
                    Flow::Dispatch(pending) => {
                        let tx = done_tx.clone();
                        request_task = Some(tokio::spawn(async move {
                            let _ = tx.send(pending.send().await).await;
                        }));
                    }
                }
            }

            Some(completion) = done_rx.recv() => {
                request_task = None;
                app.widget.settle(completion);
            }

            _ = tick.tick(), if app.widget.session().is_in_flight() => {
                app.spin_i = app.spin_i.wrapping_add(1);
            }
        }
    }

    if let Some(task) = request_task.take() {
        info!("quitting with a request in flight");
        task.abort();
    }
    Ok(())
}

/// Keyboard reader thread. Exits once the event loop drops its receiver, so
/// the runtime can shut down after quit.
fn spawn_key_reader(key_tx: mpsc::Sender<Event>) -> JoinHandle<()> {
    tokio::task::spawn_blocking(move || {
        while !key_tx.is_closed() {
            if event::poll(Duration::from_millis(100)).unwrap_or(false) {
                if let Ok(ev) = event::read() {
                    if key_tx.blocking_send(ev).is_err() {
                        break;
                    }
                }
            }
        }
    })
}

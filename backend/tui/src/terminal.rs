//! Terminal setup and the event loop behind `lenstext ui`.

use std::io::{self, Stdout};
use std::time::Duration;

use anyhow::{Context, Result};
use crossterm::event::{Event, EventStream, KeyEventKind};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use futures_util::StreamExt;
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use tokio::sync::mpsc::UnboundedReceiver;

use lenstext_workflow::RecognitionOutcome;

use crate::app::App;
use crate::input::handle_key_event;
use crate::render::draw_ui;

/// Redraw at least this often so the copied indicator clears on time.
const TICK: Duration = Duration::from_millis(200);

type Term = Terminal<CrosstermBackend<Stdout>>;

/// Take over the terminal and run the UI until the user quits.
pub async fn run(mut app: App, mut outcomes: UnboundedReceiver<RecognitionOutcome>) -> Result<()> {
    let mut terminal = setup().context("Failed to set up terminal")?;
    let result = event_loop(&mut terminal, &mut app, &mut outcomes).await;
    restore(&mut terminal)?;
    // The controller releases any open camera on drop.
    drop(app);
    result
}

async fn event_loop(
    terminal: &mut Term,
    app: &mut App,
    outcomes: &mut UnboundedReceiver<RecognitionOutcome>,
) -> Result<()> {
    let mut events = EventStream::new();
    let mut tick = tokio::time::interval(TICK);

    loop {
        terminal.draw(|f| draw_ui(f, app))?;
        if app.should_quit {
            return Ok(());
        }

        tokio::select! {
            Some(outcome) = outcomes.recv() => app.on_outcome(outcome),
            event = events.next() => match event {
                Some(Ok(Event::Key(key))) if key.kind == KeyEventKind::Press => {
                    if let Some(action) = handle_key_event(key, app) {
                        app.dispatch(action).await;
                    }
                }
                Some(Ok(_)) => {}
                Some(Err(e)) => return Err(e).context("Terminal input failed"),
                None => return Ok(()),
            },
            _ = tick.tick() => {}
        }
    }
}

fn setup() -> Result<Term> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    Ok(Terminal::new(CrosstermBackend::new(stdout))?)
}

fn restore(terminal: &mut Term) -> Result<()> {
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;
    Ok(())
}

use std::io::{self, BufRead, Write};
use std::sync::mpsc;
use std::thread;
use std::time::Duration;

use clap::Parser;
use engine_logging::{engine_debug, engine_info};
use interpreter_core::{update, AppState, AppViewModel, Msg};

use super::cli::Args;
use super::effects::EffectRunner;
use super::ui::commands::{help_text, parse_command, Command};
use super::ui::render::render_changes;
use super::{config, logging};

const TICK_INTERVAL: Duration = Duration::from_millis(75);

/// Everything the main loop reacts to.
pub(crate) enum AppEvent {
    Core(Msg),
    Input(String),
    InputClosed,
}

pub fn run_app() -> anyhow::Result<()> {
    let args = Args::parse();
    logging::initialize(args.log, args.verbose, &args.log_file);

    let mut config = config::load(args.config.as_deref())?;
    if let Some(endpoint) = &args.endpoint {
        config.endpoint = endpoint.clone();
    }
    let mode = match args.mode {
        Some(mode) => mode,
        None => config.mode()?,
    };
    let allow_logging = args.allow_logging || config.allow_logging;
    engine_info!(
        "Starting data-interpreter endpoint={} mode={} allow_logging={}",
        config.endpoint,
        mode,
        allow_logging
    );

    let (event_tx, event_rx) = mpsc::channel::<AppEvent>();
    let effects = EffectRunner::new(config.submit_settings(), event_tx.clone())?;
    let mut app = App::new(AppState::with_preferences(mode, allow_logging), effects);
    println!("{}", help_text());

    if let Some(path) = args.file {
        let _ = event_tx.send(AppEvent::Core(Msg::FileSelected { path }));
    }
    spawn_ticker(event_tx.clone());
    spawn_input_reader(event_tx);

    let mut input_closed = false;
    for event in event_rx {
        match event {
            AppEvent::Core(msg) => app.dispatch(msg),
            AppEvent::Input(line) => {
                if app.handle_input(&line) == Flow::Quit {
                    break;
                }
            }
            AppEvent::InputClosed => input_closed = true,
        }
        // Piped input ends before replies arrive; wait for in-flight work.
        if input_closed && app.is_settled() {
            break;
        }
    }
    app.flush();
    engine_info!("Exiting");
    Ok(())
}

#[derive(Debug, PartialEq, Eq)]
enum Flow {
    Continue,
    Quit,
}

struct App {
    state: AppState,
    rendered: AppViewModel,
    effects: EffectRunner,
}

impl App {
    fn new(state: AppState, effects: EffectRunner) -> Self {
        Self {
            rendered: AppViewModel {
                mode: state.mode(),
                allow_logging: state.allow_logging(),
                ..AppViewModel::default()
            },
            state,
            effects,
        }
    }

    fn dispatch(&mut self, msg: Msg) {
        let render = matches!(msg, Msg::Tick);
        let state = std::mem::take(&mut self.state);
        let (state, effects) = update(state, msg);
        self.state = state;
        self.effects.enqueue(effects);
        if render {
            self.render_if_dirty();
        }
    }

    fn handle_input(&mut self, line: &str) -> Flow {
        let columns = self.state.view().columns;
        match parse_command(line, &columns) {
            Ok(Some(Command::Core(msg))) => {
                engine_debug!("Input mapped to {:?}", msg);
                self.dispatch(msg);
            }
            Ok(Some(Command::Help)) => println!("{}", help_text()),
            Ok(Some(Command::Quit)) => return Flow::Quit,
            Ok(None) => {}
            Err(err) => println!("{err}"),
        }
        Flow::Continue
    }

    fn render_if_dirty(&mut self) {
        if !self.state.consume_dirty() {
            return;
        }
        let view = self.state.view();
        let lines = render_changes(&self.rendered, &view);
        if !lines.is_empty() {
            let mut out = io::stdout().lock();
            for line in &lines {
                let _ = writeln!(out, "{line}");
            }
            let _ = out.flush();
        }
        self.rendered = view;
    }

    fn is_settled(&self) -> bool {
        let view = self.state.view();
        !view.is_submitting && !view.is_ingesting
    }

    fn flush(&mut self) {
        self.render_if_dirty();
    }
}

fn spawn_input_reader(event_tx: mpsc::Sender<AppEvent>) {
    thread::spawn(move || {
        let stdin = io::stdin();
        for line in stdin.lock().lines() {
            let Ok(line) = line else {
                break;
            };
            if event_tx.send(AppEvent::Input(line)).is_err() {
                return;
            }
        }
        let _ = event_tx.send(AppEvent::InputClosed);
    });
}

// Background tick to throttle rendering.
fn spawn_ticker(event_tx: mpsc::Sender<AppEvent>) {
    thread::spawn(move || {
        while event_tx.send(AppEvent::Core(Msg::Tick)).is_ok() {
            thread::sleep(TICK_INTERVAL);
        }
    });
}

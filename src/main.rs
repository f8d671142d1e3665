use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use duelboard::core::ClientSettings;
use duelboard::game::{
    GameSession, MoveCoordinator, PieceColor, PositionState, SessionEvent, Square,
};
use duelboard::networking::{ChannelTransport, LocalRelay};
use duelboard::rendering::BoardView;
use crossbeam_channel::Receiver;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "duelboard", version, about = "Two-player chess over a local relay")]
struct Cli {
    /// Settings file, defaults to the platform config directory
    #[arg(long, global = true)]
    settings: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Play both seats from this terminal, one move per line (e.g. `e2 e4`)
    Play {
        /// Start from this FEN instead of the initial setup
        #[arg(long)]
        fen: Option<String>,
    },
    /// Play the given moves (e.g. `e2e4 e7e5`) and print the final board
    Replay {
        #[arg(long)]
        fen: Option<String>,
        moves: Vec<String>,
    },
}

/// One client: its coordinator and the frames the relay sent it
struct Seat {
    coordinator: MoveCoordinator<ChannelTransport>,
    inbox: Receiver<String>,
}

/// Relay plus the White and Black clients
struct LocalTable {
    relay: LocalRelay,
    white: Seat,
    black: Seat,
}

impl LocalTable {
    fn new(fen: Option<&str>) -> anyhow::Result<Self> {
        let position = match fen {
            Some(fen) => PositionState::from_fen(fen).context("Invalid --fen")?,
            None => PositionState::default(),
        };
        let mut relay = LocalRelay::new(position);

        let seat = |relay: &mut LocalRelay| {
            let connection = relay.connect();
            Seat {
                coordinator: MoveCoordinator::with_session(
                    GameSession::default(),
                    connection.transport,
                ),
                inbox: connection.inbox,
            }
        };
        let white = seat(&mut relay);
        let black = seat(&mut relay);

        let mut table = Self {
            relay,
            white,
            black,
        };
        table.settle();
        Ok(table)
    }

    fn seat_mut(&mut self, color: PieceColor) -> &mut Seat {
        match color {
            PieceColor::White => &mut self.white,
            PieceColor::Black => &mut self.black,
        }
    }

    /// Deliver queued frames in both directions until nothing is in flight
    fn settle(&mut self) -> Vec<SessionEvent> {
        let mut events = Vec::new();
        loop {
            let mut handled = self.relay.pump();
            for color in [PieceColor::White, PieceColor::Black] {
                let seat = self.seat_mut(color);
                let frames: Vec<String> = seat.inbox.try_iter().collect();
                handled += frames.len();
                for frame in frames {
                    let produced = seat.coordinator.handle_frame(&frame);
                    debug!("[TABLE] {} handled {} events", color.name(), produced.len());
                    if color == PieceColor::White {
                        events.extend(produced);
                    }
                }
            }
            if handled == 0 {
                return events;
            }
        }
    }

    /// Drag and drop on the seat whose turn it is
    fn play(&mut self, from: Square, to: Square) -> Option<Vec<SessionEvent>> {
        let color = self.relay.position().turn();
        let coordinator = &mut self.seat_mut(color).coordinator;
        let (row, col) = from.to_grid();
        if !coordinator.drag_start(row, col) {
            return None;
        }
        let (row, col) = to.to_grid();
        let mut events = coordinator.drop_on(row, col);
        events.extend(self.settle());
        Some(events)
    }

    fn is_over(&self) -> bool {
        self.white.coordinator.is_terminated() && self.black.coordinator.is_terminated()
    }

    fn render(&self, settings: &ClientSettings) -> String {
        let coordinator = match self.relay.position().turn() {
            PieceColor::White => &self.white.coordinator,
            PieceColor::Black => &self.black.coordinator,
        };
        BoardView::project(coordinator.session(), coordinator.phase()).render_text(settings)
    }
}

fn parse_squares(line: &str) -> Option<(Square, Square)> {
    let compact: String = line.split_whitespace().collect();
    if compact.len() != 4 {
        return None;
    }
    Some((
        Square::from_algebraic(compact.get(0..2)?)?,
        Square::from_algebraic(compact.get(2..4)?)?,
    ))
}

fn report(events: &[SessionEvent]) {
    for event in events {
        if let SessionEvent::GameOver { winner } = event {
            println!("{} wins by checkmate!", winner.name());
        }
    }
}

fn run_play(fen: Option<String>, settings: &ClientSettings) -> anyhow::Result<()> {
    let mut table = LocalTable::new(fen.as_deref())?;
    print!("{}", table.render(settings));

    let stdin = io::stdin();
    let mut stdout = io::stdout();
    loop {
        print!("> ");
        stdout.flush()?;

        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            break;
        }
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if line == "quit" {
            break;
        }

        let Some((from, to)) = parse_squares(line) else {
            println!("Enter a move as two squares, e.g. `e2 e4`");
            continue;
        };
        match table.play(from, to) {
            None => println!("No piece of the side to move on {}", from),
            Some(events) => {
                print!("{}", table.render(settings));
                report(&events);
            }
        }
        if table.is_over() {
            break;
        }
    }
    Ok(())
}

fn run_replay(
    fen: Option<String>,
    moves: &[String],
    settings: &ClientSettings,
) -> anyhow::Result<()> {
    let mut table = LocalTable::new(fen.as_deref())?;
    let mut events = Vec::new();

    for text in moves {
        let Some((from, to)) = parse_squares(text) else {
            bail!("Cannot parse move `{}`", text);
        };
        match table.play(from, to) {
            Some(produced) => events.extend(produced),
            None => bail!("No piece of the side to move on {}", from),
        }
    }

    info!("[REPLAY] Played {} moves", moves.len());
    print!("{}", table.render(settings));
    report(&events);
    Ok(())
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let settings_path = cli.settings.unwrap_or_else(ClientSettings::default_path);
    let settings = ClientSettings::load_or_default(&settings_path);

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&settings.log_filter));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();

    match cli.command {
        Command::Play { fen } => run_play(fen, &settings),
        Command::Replay { fen, moves } => run_replay(fen, &moves, &settings),
    }
}

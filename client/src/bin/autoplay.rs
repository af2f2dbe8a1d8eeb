//! Plays rounds of every game against a remote backend.

use anyhow::Context;
use clap::Parser;
use houseedge_client::{apply_session, follow_sessions, AuthError, Authenticator, Client};
use houseedge_execution::{casino::mines::Reveal, Config, GameRng, Ledger, LedgerStore, Table};
use houseedge_types::casino::{GameKind, Side};
use std::path::PathBuf;
use tracing::{info, warn};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Backend URL
    #[arg(short, long, default_value = "http://localhost:8080")]
    url: String,

    #[arg(short, long)]
    email: String,

    #[arg(short, long)]
    password: String,

    /// Optional table configuration (YAML)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Rounds to play of each game
    #[arg(short, long, default_value_t = 3)]
    rounds: usize,

    /// Safe cells to aim for before cashing out of Mines
    #[arg(long, default_value_t = 2)]
    reveals: usize,
}

async fn sign_in(client: &Client, email: &str, password: &str) -> anyhow::Result<()> {
    match client.sign_in(email, password).await {
        Ok(_) => Ok(()),
        Err(AuthError::Rejected(message)) => {
            info!(%message, "sign-in rejected, creating account");
            client
                .sign_up(email, password)
                .await
                .context("failed to create account")?;
            Ok(())
        }
        Err(e) => Err(e).context("failed to sign in"),
    }
}

async fn play_mines<S: LedgerStore>(
    table: &mut Table<S>,
    rng: &mut GameRng,
    reveals: usize,
) -> anyhow::Result<()> {
    table.place_bet(GameKind::MinesReveal)?;
    let cells = table.mines().rules().cells;
    let mut safe = 0;
    for cell in rng.sample_distinct(cells, cells) {
        if safe >= reveals {
            break;
        }
        match table.reveal(cell)? {
            Reveal::Safe { .. } => safe += 1,
            Reveal::Cleared { .. } | Reveal::Mine => break,
        }
    }
    if table.mines().phase().is_active() {
        table.cash_out()?;
    }
    if let Some(outcome) = table.finish_after_delay(GameKind::MinesReveal).await {
        info!(payout = outcome.payout, delta = outcome.delta, "mines finished");
    }
    Ok(())
}

/// Picks a random side for every fixture without a pick.
///
/// Picks left over from a failed wager stay in place.
fn fill_picks<S: LedgerStore>(table: &mut Table<S>, rng: &mut GameRng) -> anyhow::Result<()> {
    let open: Vec<String> = table
        .sports()
        .fixtures()
        .iter()
        .filter(|f| table.sports().selection().side(&f.id).is_none())
        .map(|f| f.id.clone())
        .collect();
    for id in open {
        let side = if rng.coin() { Side::Home } else { Side::Away };
        table.toggle_pick(&id, side)?;
    }
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Parse args
    let args = Args::parse();
    let config = match &args.config {
        Some(path) => Config::from_file(path).context("failed to load config")?,
        None => Config::default(),
    };
    let config = config.validate().context("invalid config")?;

    // Create logger
    tracing_subscriber::fmt()
        .with_max_level(config.log_level)
        .init();

    // Sign in and attach the ledger
    let client = Client::new(&args.url).context("invalid backend url")?;
    sign_in(&client, &args.email, &args.password).await?;
    let ledger = Ledger::with_snapshot(client.clone(), config.starting_funds());
    apply_session(&ledger, client.session().as_ref()).await;
    let follower = follow_sessions(&client, ledger.clone());
    info!(balance = ledger.balance(), lost = ledger.total_lost(), "ready");

    let mut table = Table::new(config, ledger.clone());
    let mut rng = GameRng::new(table.seed(), u64::MAX);
    for round in 0..args.rounds {
        match table.play_plinko().await {
            Ok(outcome) => info!(
                round,
                multiplier = outcome.multiplier,
                payout = outcome.payout,
                "plinko finished"
            ),
            Err(e) => warn!(round, error = %e, "plinko skipped"),
        }

        if let Err(e) = play_mines(&mut table, &mut rng, args.reveals).await {
            warn!(round, error = %e, "mines skipped");
        }

        fill_picks(&mut table, &mut rng)?;
        match table.play_sports().await {
            Ok(outcome) => info!(round, delta = outcome.delta, "sports settled"),
            Err(e) => warn!(round, error = %e, "sports skipped"),
        }

        let snapshot = ledger.snapshot();
        info!(
            round,
            balance = snapshot.virtual_balance,
            lost = snapshot.total_lost,
            "round complete"
        );
    }

    // Push the final snapshot before exiting
    if let Some(sync) = ledger.schedule_sync() {
        sync.await.context("final sync task failed")?;
    }
    follower.abort();
    Ok(())
}

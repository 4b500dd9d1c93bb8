use std::error::Error;
use std::path::PathBuf;
use std::sync::Arc;

use atty::Stream;
use clap::{Parser, Subcommand, ValueEnum};
use serde_json::json;
use termimad::{FmtText, MadSkin, terminal_size};
use tracing_subscriber::EnvFilter;
use wordbook_rs::controller::user_message;
use wordbook_rs::{
    AddOutcome, Config, Controller, Entry, Favorites, KeyValueStore, LookupClient, MemoryStore,
    PersistenceAdapter, Theme,
};

#[derive(Parser, Debug)]
#[command(
    name = "wordbook",
    about = "Look up English words and keep a list of favorites",
    version
)]
pub struct Cli {
    /// Emit JSON instead of human-readable output.
    #[arg(long, global = true)]
    json: bool,

    /// Favorites file to use instead of the default location.
    #[arg(long, global = true, value_name = "PATH")]
    store: Option<PathBuf>,

    /// Keep favorites in memory for this run only.
    #[arg(long, global = true, conflicts_with = "store")]
    ephemeral: bool,

    /// Base URL of the dictionary service.
    #[arg(long, global = true, value_name = "URL")]
    api_base: Option<String>,

    /// Show every entry the service returns instead of only the first.
    #[arg(long, global = true)]
    all: bool,

    /// Color theme for this run.
    #[arg(long, global = true, value_enum)]
    theme: Option<Theme>,

    /// Log debug output to stderr.
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Look up a word and show its definitions.
    Lookup {
        /// Word to look up.
        term: String,
        /// Also save the displayed entry as a favorite.
        #[arg(long)]
        save: bool,
    },
    /// Manage saved words.
    #[command(subcommand)]
    Favorites(FavoritesCommand),
    /// Show or change the stored color theme.
    Theme {
        #[arg(value_enum)]
        action: Option<ThemeAction>,
    },
}

#[derive(Subcommand, Debug)]
enum FavoritesCommand {
    /// List saved words in the order they were added.
    List,
    /// Show the saved entry for a word.
    Show {
        /// Saved word, matched exactly.
        word: String,
    },
    /// Look a word up and save it.
    Add {
        /// Word to look up and save.
        term: String,
    },
    /// Forget a saved word.
    Remove {
        /// Saved word, matched exactly.
        word: String,
    },
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum ThemeAction {
    Light,
    Dark,
    Toggle,
}

struct Output {
    json: bool,
    theme: Theme,
}

struct Session {
    favorites: Arc<Favorites>,
    controller: Controller<LookupClient>,
}

impl Session {
    fn open(config: &Config, ephemeral: bool) -> Result<Self, Box<dyn Error>> {
        let store: Arc<dyn KeyValueStore> = if ephemeral {
            Arc::new(MemoryStore::new())
        } else {
            config.open_store()
        };
        let favorites = Arc::new(Favorites::hydrated(PersistenceAdapter::from_shared(store)));
        let client = LookupClient::new(config.api_base.clone())?;
        let controller =
            Controller::new(client, Arc::clone(&favorites)).with_policy(config.candidates);
        Ok(Self {
            favorites,
            controller,
        })
    }
}

pub fn run() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let mut config = Config::load();
    if let Some(path) = cli.store {
        config.store_path = Some(path);
    }
    if let Some(base) = cli.api_base {
        config.api_base = base;
    }
    if cli.all {
        config.candidates = wordbook_rs::CandidatePolicy::All;
    }
    let output = Output {
        json: cli.json,
        theme: cli.theme.unwrap_or_else(|| config.effective_theme()),
    };

    if let Command::Theme { action } = cli.command {
        return handle_theme(config, action, &output);
    }

    let mut session = Session::open(&config, cli.ephemeral)?;
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    match cli.command {
        Command::Lookup { term, save } => {
            runtime.block_on(handle_lookup(&mut session, term, save, &output))
        }
        Command::Favorites(FavoritesCommand::List) => handle_list(&session, &output),
        Command::Favorites(FavoritesCommand::Show { word }) => {
            handle_show(&session, &word, &output)
        }
        Command::Favorites(FavoritesCommand::Add { term }) => {
            runtime.block_on(handle_add(&mut session, term, &output))
        }
        Command::Favorites(FavoritesCommand::Remove { word }) => {
            handle_remove(&session, &word, &output)
        }
        Command::Theme { .. } => Ok(()),
    }
}

fn init_tracing(verbose: bool) {
    let fallback = if verbose {
        "warn,wordbook_rs=debug"
    } else {
        "warn"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

async fn search(session: &mut Session, term: String) -> Result<(), Box<dyn Error>> {
    session.controller.set_term(term);
    if let Err(err) = session.controller.search().await {
        return Err(user_message(&err).into());
    }
    Ok(())
}

async fn handle_lookup(
    session: &mut Session,
    term: String,
    save: bool,
    output: &Output,
) -> Result<(), Box<dyn Error>> {
    search(session, term).await?;
    let saved = if save {
        Some(session.controller.save_current()?)
    } else {
        None
    };
    let state = session.controller.state();

    if output.json {
        let payload = json!({
            "term": state.term(),
            "results": state.results().iter().map(|entry| {
                json!({
                    "entry": entry,
                    "favorite": session.favorites.is_favorite(&entry.word),
                })
            }).collect::<Vec<_>>(),
            "saved": saved.map(outcome_label),
        });
        println!("{}", serde_json::to_string_pretty(&payload)?);
    } else {
        for entry in state.results() {
            print_entry(entry, session.favorites.is_favorite(&entry.word), output.theme);
        }
        if let (Some(outcome), Some(entry)) = (saved, state.entry()) {
            print_add_outcome(&entry.word, outcome);
        }
    }
    Ok(())
}

async fn handle_add(
    session: &mut Session,
    term: String,
    output: &Output,
) -> Result<(), Box<dyn Error>> {
    search(session, term).await?;
    let outcome = session.controller.save_current()?;
    let word = session
        .controller
        .state()
        .entry()
        .map(|entry| entry.word.clone())
        .unwrap_or_default();
    if output.json {
        let payload = json!({ "word": word, "outcome": outcome_label(outcome) });
        println!("{}", serde_json::to_string_pretty(&payload)?);
    } else {
        print_add_outcome(&word, outcome);
    }
    Ok(())
}

fn handle_remove(session: &Session, word: &str, output: &Output) -> Result<(), Box<dyn Error>> {
    let removal = session.controller.remove_favorite(word);
    if let Some(err) = &removal.store_error {
        eprintln!("warning: \"{word}\" may still be stored: {err}");
    }
    if output.json {
        let payload = json!({
            "word": word,
            "was_favorite": removal.was_favorite,
            "store_error": removal.store_error.as_ref().map(|err| err.to_string()),
        });
        println!("{}", serde_json::to_string_pretty(&payload)?);
    } else if removal.was_favorite {
        println!("Removed \"{word}\" from favorites.");
    } else {
        println!("\"{word}\" was not a favorite.");
    }
    Ok(())
}

fn handle_list(session: &Session, output: &Output) -> Result<(), Box<dyn Error>> {
    let entries = session.controller.favorites();
    if output.json {
        println!("{}", serde_json::to_string_pretty(&entries)?);
    } else {
        print_favorites_table(&entries);
    }
    Ok(())
}

fn handle_show(session: &Session, word: &str, output: &Output) -> Result<(), Box<dyn Error>> {
    let entry = session
        .favorites
        .get(word)
        .ok_or_else(|| format!("\"{word}\" is not a favorite"))?;
    if output.json {
        println!("{}", serde_json::to_string_pretty(&entry)?);
    } else {
        print_entry(&entry, true, output.theme);
    }
    Ok(())
}

fn handle_theme(
    mut config: Config,
    action: Option<ThemeAction>,
    output: &Output,
) -> Result<(), Box<dyn Error>> {
    let current = config.effective_theme();
    let next = match action {
        None => None,
        Some(ThemeAction::Light) => Some(Theme::Light),
        Some(ThemeAction::Dark) => Some(Theme::Dark),
        Some(ThemeAction::Toggle) => Some(current.toggled()),
    };
    let theme = match next {
        Some(theme) => {
            config.theme = Some(theme);
            config.save()?;
            theme
        }
        None => current,
    };
    if output.json {
        println!("{}", json!({ "theme": theme.to_string() }));
    } else {
        println!("Theme: {theme}");
    }
    Ok(())
}

fn outcome_label(outcome: AddOutcome) -> &'static str {
    match outcome {
        AddOutcome::Added => "added",
        AddOutcome::AlreadySaved => "already_saved",
    }
}

fn print_add_outcome(word: &str, outcome: AddOutcome) {
    match outcome {
        AddOutcome::Added => println!("Saved \"{word}\" to favorites."),
        AddOutcome::AlreadySaved => println!("\"{word}\" is already a favorite."),
    }
}

fn print_favorites_table(entries: &[Entry]) {
    if entries.is_empty() {
        println!("No favorites yet.");
        return;
    }
    let width = entries
        .iter()
        .map(|entry| entry.word.chars().count())
        .max()
        .unwrap_or(4)
        .max("WORD".len());
    println!("{:<width$}  {}", "WORD", "DEFINITION", width = width);
    println!("{:-<width$}  {}", "", "----------", width = width);
    for entry in entries {
        let summary = entry.summary().unwrap_or("<no definition>");
        println!("{:<width$}  {}", entry.word, summary, width = width);
    }
}

fn entry_markdown(entry: &Entry, favorite: bool) -> String {
    let mut text = String::new();
    let marker = if favorite { " ★" } else { "" };
    text.push_str(&format!("# {}{marker}\n", entry.word));

    let pronunciations: Vec<_> = entry
        .phonetics
        .iter()
        .filter(|phonetic| !phonetic.text.is_empty())
        .map(|phonetic| format!("*{}*", phonetic.text))
        .collect();
    if !pronunciations.is_empty() {
        text.push_str(&format!("{}\n", pronunciations.join(" · ")));
    }
    if let Some(audio) = entry.audio_url() {
        text.push_str(&format!("Audio: {audio}\n"));
    }
    if let Some(origin) = &entry.origin {
        text.push_str(&format!("Origin: {origin}\n"));
    }

    for meaning in &entry.meanings {
        text.push_str(&format!("\n## {}\n", meaning.part_of_speech));
        for (index, definition) in meaning.definitions.iter().enumerate() {
            text.push_str(&format!("{}. {}\n", index + 1, definition.definition));
            if let Some(example) = &definition.example {
                text.push_str(&format!("> {example}\n"));
            }
        }
        if let Some(synonyms) = format_list(&meaning.synonyms, 6) {
            text.push_str(&format!("Synonyms: {synonyms}\n"));
        }
        if let Some(antonyms) = format_list(&meaning.antonyms, 6) {
            text.push_str(&format!("Antonyms: {antonyms}\n"));
        }
    }
    text
}

fn print_entry(entry: &Entry, favorite: bool, theme: Theme) {
    render_markdown(&entry_markdown(entry, favorite), theme);
}

fn format_list(items: &[String], limit: usize) -> Option<String> {
    if items.is_empty() {
        return None;
    }
    let truncated = items.len() > limit;
    let display = if truncated {
        &items[..limit]
    } else {
        &items[..]
    };
    let mut text = display.join(", ");
    if truncated {
        text.push_str(", …");
    }
    Some(text)
}

fn stdout_is_tty() -> bool {
    atty::is(Stream::Stdout)
}

fn markdown_width() -> usize {
    let (width, _) = terminal_size();
    width.max(60) as usize
}

fn markdown_skin(theme: Theme) -> MadSkin {
    match theme {
        Theme::Light => MadSkin::default_light(),
        Theme::Dark => MadSkin::default_dark(),
    }
}

fn render_markdown(body: &str, theme: Theme) {
    let trimmed = body.trim();
    if trimmed.is_empty() {
        return;
    }
    if stdout_is_tty() {
        let skin = markdown_skin(theme);
        let formatted = FmtText::from(&skin, trimmed, Some(markdown_width()));
        println!("{formatted}");
    } else {
        println!("{trimmed}\n");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wordbook_rs::{Definition, Meaning, Phonetic};

    #[test]
    fn cli_parses_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from([
            "wordbook", "favorites", "remove", "dog", "--json", "--store", "/tmp/favs.json",
        ])
        .unwrap();
        assert!(cli.json);
        assert_eq!(cli.store, Some(PathBuf::from("/tmp/favs.json")));
        assert!(matches!(
            cli.command,
            Command::Favorites(FavoritesCommand::Remove { ref word }) if word == "dog"
        ));
    }

    #[test]
    fn store_and_ephemeral_conflict() {
        let result = Cli::try_parse_from([
            "wordbook", "--ephemeral", "--store", "x.json", "favorites", "list",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn markdown_lists_meanings_and_marks_favorites() {
        let entry = Entry {
            word: "dog".to_string(),
            phonetics: vec![Phonetic {
                text: "/dɒɡ/".to_string(),
                audio_url: Some("https://example.com/dog.mp3".to_string()),
            }],
            origin: None,
            meanings: vec![Meaning {
                part_of_speech: "noun".to_string(),
                definitions: vec![Definition {
                    definition: "A mammal.".to_string(),
                    example: Some("The dog barked.".to_string()),
                    synonyms: Vec::new(),
                    antonyms: Vec::new(),
                }],
                synonyms: vec!["hound".to_string()],
                antonyms: Vec::new(),
            }],
        };
        let text = entry_markdown(&entry, true);
        assert!(text.starts_with("# dog ★\n"));
        assert!(text.contains("Audio: https://example.com/dog.mp3"));
        assert!(text.contains("## noun\n1. A mammal.\n> The dog barked.\n"));
        assert!(text.contains("Synonyms: hound"));
        assert!(!entry_markdown(&entry, false).contains('★'));
    }

    #[test]
    fn format_list_truncates() {
        let items: Vec<String> = (0..8).map(|i| i.to_string()).collect();
        assert_eq!(format_list(&items, 3).as_deref(), Some("0, 1, 2, …"));
        assert_eq!(format_list(&[], 3), None);
    }
}

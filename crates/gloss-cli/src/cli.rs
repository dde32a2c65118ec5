use clap::{ArgAction, Args, Parser, Subcommand};
use clap_complete::Shell;

use gloss_core::VERSION;

/// Gloss - persistent, optionally encrypted annotations for documents
#[derive(Parser)]
#[command(name = "gloss")]
#[command(author, version = VERSION, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to the annotation store
    #[arg(short, long, global = true, env = "GLOSS_STORE")]
    pub store: Option<String>,

    /// Run without a passphrase (records are written in plaintext)
    #[arg(long, global = true)]
    pub no_passphrase: bool,

    /// Quiet mode (minimal output)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Verbose logging to stderr
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Read and write raw secure records
    Record(RecordArgs),

    /// Encode and decode text anchors against a document
    Anchor(AnchorArgs),

    /// Manage highlights and notes for a page
    Annotate(AnnotateArgs),

    /// Store or remove the passphrase in the OS keychain
    Keychain(KeychainArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

/// Arguments for the `record` command group
#[derive(Args)]
pub struct RecordArgs {
    #[command(subcommand)]
    pub command: RecordSubcommand,
}

#[derive(Subcommand)]
pub enum RecordSubcommand {
    /// Print a record as JSON
    Get {
        #[arg(value_name = "NAME")]
        name: String,
    },

    /// Store a JSON value under a name
    Put {
        #[arg(value_name = "NAME")]
        name: String,

        /// JSON value to store
        #[arg(value_name = "JSON")]
        value: String,
    },

    /// Delete a record
    Delete {
        #[arg(value_name = "NAME")]
        name: String,
    },

    /// List record names
    List {
        /// Only names starting with this prefix
        #[arg(long, default_value = "")]
        prefix: String,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

/// Arguments for the `anchor` command group
#[derive(Args)]
pub struct AnchorArgs {
    #[command(subcommand)]
    pub command: AnchorSubcommand,
}

#[derive(Subcommand)]
pub enum AnchorSubcommand {
    /// Print the anchor for a quoted passage
    Encode {
        #[command(flatten)]
        doc: DocumentArgs,

        #[command(flatten)]
        quote: QuoteArgs,
    },

    /// Print the text an anchor resolves to
    Decode {
        #[command(flatten)]
        doc: DocumentArgs,

        /// Anchor JSON
        #[arg(long, value_name = "JSON")]
        anchor: String,
    },
}

/// The document an operation runs against
#[derive(Args)]
pub struct DocumentArgs {
    /// XHTML file standing in for the live page
    #[arg(long, value_name = "DOC")]
    pub file: String,
}

/// A passage selected by quoting it
#[derive(Args)]
pub struct QuoteArgs {
    /// Exact text to select
    #[arg(long, value_name = "TEXT")]
    pub quote: String,

    /// Which match to select (0-based)
    #[arg(long, default_value_t = 0)]
    pub occurrence: usize,
}

/// Arguments for the `annotate` command group
#[derive(Args)]
pub struct AnnotateArgs {
    #[command(subcommand)]
    pub command: AnnotateSubcommand,
}

#[derive(Subcommand)]
pub enum AnnotateSubcommand {
    /// Show highlights and notes for a page
    Show {
        #[arg(value_name = "URL")]
        url: String,

        #[command(flatten)]
        doc: DocumentArgs,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Highlight a quoted passage
    Highlight {
        #[arg(value_name = "URL")]
        url: String,

        #[command(flatten)]
        doc: DocumentArgs,

        #[command(flatten)]
        quote: QuoteArgs,
    },

    /// Remove every highlight from a page
    Clear {
        #[arg(value_name = "URL")]
        url: String,

        #[command(flatten)]
        doc: DocumentArgs,
    },

    /// Write the page note, or a point note with --x/--y
    Note(NoteArgs),

    /// Delete a note by id
    RemoveNote {
        #[arg(value_name = "URL")]
        url: String,

        #[command(flatten)]
        doc: DocumentArgs,

        /// Note id
        #[arg(long, value_name = "UUID")]
        id: String,
    },

    /// List annotated pages
    Pages {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

/// Arguments for `annotate note`
#[derive(Args)]
pub struct NoteArgs {
    #[arg(value_name = "URL")]
    pub url: String,

    #[command(flatten)]
    pub doc: DocumentArgs,

    /// Note body
    #[arg(long)]
    pub text: String,

    /// Add tags to the note (repeatable, or comma-separated)
    #[arg(short, long, value_name = "TAG")]
    pub tag: Vec<String>,

    /// Horizontal position of a point note
    #[arg(long, requires = "y", allow_negative_numbers = true)]
    pub x: Option<f64>,

    /// Vertical position of a point note
    #[arg(long, requires = "x", allow_negative_numbers = true)]
    pub y: Option<f64>,

    /// Replace the point note with this id
    #[arg(long, value_name = "UUID")]
    pub id: Option<String>,
}

/// Arguments for the `keychain` command group
#[derive(Args)]
pub struct KeychainArgs {
    #[command(subcommand)]
    pub command: KeychainSubcommand,
}

#[derive(Subcommand)]
pub enum KeychainSubcommand {
    /// Save the passphrase for this store
    Set,

    /// Forget the saved passphrase for this store
    Clear,
}

/// Arguments for the `completions` command
#[derive(Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    #[arg(value_name = "SHELL")]
    pub shell: Shell,
}

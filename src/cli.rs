use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use hsp::BrowserKind;

#[derive(Parser, Debug)]
#[command(name = "hsp")]
#[command(about = "Uni Tübingen Hochschulsport course booking and status retrieval")]
#[command(version)]
pub struct Cli {
    /// Increase verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Browser to drive
    #[arg(short, long, global = true, value_enum, default_value = "chrome")]
    pub browser: BrowserArg,

    /// Explicit browser executable
    #[arg(long, global = true, value_name = "PATH")]
    pub browser_path: Option<PathBuf>,

    /// Show the browser window instead of running headless
    #[arg(long, global = true)]
    pub headed: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Check the validity of a credentials file
    CheckCredentials {
        /// JSON or YAML file with booking credentials
        #[arg(long, value_name = "FILE")]
        credentials: PathBuf,
    },

    /// Show the booking status of a course
    CourseStatus {
        /// Course number as shown on the listing page
        #[arg(long)]
        course: String,
    },

    /// Book a course
    Booking {
        /// JSON or YAML file with booking credentials
        #[arg(long, value_name = "FILE")]
        credentials: PathBuf,

        /// Course number as shown on the listing page
        #[arg(long)]
        course: String,

        /// Where to write a PNG screenshot of the confirmation page
        #[arg(long, value_name = "FILE", default_value = "confirmation.png")]
        booking_out: PathBuf,

        /// Replace an existing screenshot file
        #[arg(long)]
        overwrite: bool,

        /// Leave the browser open after booking until Ctrl-C
        #[arg(long)]
        keep_open: bool,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum BrowserArg {
    Chrome,
    Chromium,
}

impl From<BrowserArg> for BrowserKind {
    fn from(arg: BrowserArg) -> Self {
        match arg {
            BrowserArg::Chrome => BrowserKind::Chrome,
            BrowserArg::Chromium => BrowserKind::Chromium,
        }
    }
}

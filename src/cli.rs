use clap::Parser;

#[derive(Parser, Debug)]
#[command(name = "bundlezip")]
#[command(version)]
#[command(about = "Inspect and extract app bundle archives", long_about = None)]
#[command(after_help = "Examples:\n  \
  bundlezip -l MyApp.ipa                 list all members of the archive\n  \
  bundlezip MyApp.ipa Info.plist -p      print the app's Info.plist to stdout\n  \
  bundlezip MyApp.ipa -d out             extract the whole archive into out/")]
pub struct Cli {
    /// Archive file path (.ipa, .xcarchive, .zip)
    #[arg(value_name = "FILE")]
    pub file: String,

    /// Member paths to select; suffix match unless --exact (default: all)
    #[arg(value_name = "PATHS")]
    pub paths: Vec<String>,

    /// List files (short format)
    #[arg(short = 'l')]
    pub list: bool,

    /// List verbosely with sizes and timestamps
    #[arg(short = 'v')]
    pub verbose: bool,

    /// Extract files to pipe, no messages
    #[arg(short = 'p')]
    pub pipe: bool,

    /// Extract files into exdir
    #[arg(short = 'd', value_name = "DIR")]
    pub extract_dir: Option<String>,

    /// Match member paths exactly instead of by suffix
    #[arg(short = 'e', long)]
    pub exact: bool,

    /// Skip checksum verification of extracted data
    #[arg(long)]
    pub no_verify: bool,

    /// Quiet mode (-qq => quieter)
    #[arg(short = 'q', action = clap::ArgAction::Count)]
    pub quiet: u8,
}

impl Cli {
    pub fn is_quiet(&self) -> bool {
        self.quiet > 0 || self.pipe
    }

    pub fn is_very_quiet(&self) -> bool {
        self.quiet > 1
    }
}

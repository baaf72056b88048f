use crate::flags::FlagRegistry;
use clap::Parser;
use std::path::PathBuf;

/// Raw command-line values. Nothing here is validated; the collector does that.
#[derive(Parser, Debug, Clone, Default, PartialEq)]
#[command(
    name = "eodms-cli",
    about = "Search, order and download imagery from the EODMS",
    disable_version_flag = true
)]
pub struct Cli {
    /// The username of the EODMS account used for the search and order.
    #[arg(short = 'u', long)]
    pub username: Option<String>,

    /// The password of the EODMS account used for the search and order.
    #[arg(short = 'p', long)]
    pub password: Option<String>,

    /// The type of process to run from this list of options:
    /// full, order_csv, record_id, download_available, download_results.
    #[arg(short = 'r', long)]
    pub process: Option<String>,

    /// An input file (GeoJSON, KML, GML, Shapefile or CSV), a WKT feature or
    /// a set of record IDs, depending on the process.
    #[arg(short = 'i', long = "input_val", allow_hyphen_values = true)]
    pub input_val: Option<String>,

    /// The collection(s) to search, separated by commas.
    #[arg(short = 'c', long)]
    pub collections: Option<String>,

    /// Search filters, <collection>.<field_id>=<value>|<value>,...
    #[arg(short = 'f', long)]
    pub filters: Option<String>,

    /// A date range (YYYYMMDD[THHMMSS]-YYYYMMDD[THHMMSS]) or a time-frame ("24 hours").
    #[arg(short = 'd', long)]
    pub dates: Option<String>,

    /// The maximum number of images to order and download, and the maximum
    /// number of images per order, separated by a colon.
    #[arg(short = 'm', long)]
    pub maximum: Option<String>,

    /// The priority level of the order: low, medium, high or urgent.
    #[arg(short = 'l', long)]
    pub priority: Option<String>,

    /// The output geospatial file for the search results.
    #[arg(short = 'o', long)]
    pub output: Option<String>,

    /// Download Radarsat-1 images from the AWS Open Data Registry when available.
    #[arg(short = 'a', long)]
    pub aws: bool,

    /// The minimum percentage of overlap between the AOI and the images.
    #[arg(long)]
    pub overlap: Option<String>,

    /// Order IDs and/or order item IDs, orders:<id>,...|items:<id>,...
    #[arg(long)]
    pub orderitems: Option<String>,

    /// Search only, without ordering or downloading.
    #[arg(long = "no_order")]
    pub no_order: bool,

    /// The folder where images are downloaded.
    #[arg(long)]
    pub downloads: Option<PathBuf>,

    /// Run without prompting; missing required values end the process.
    #[arg(short = 's', long)]
    pub silent: bool,

    /// Print the version and exit.
    #[arg(short = 'v', long)]
    pub version: bool,

    /// Configuration file.
    #[arg(long, default_value = "config.toml")]
    pub config: PathBuf,

    /// Offline collection catalog, used instead of querying the RAPI.
    #[arg(long)]
    pub catalog: Option<PathBuf>,
}

impl Cli {
    pub fn parse_args() -> Self {
        Self::parse_from(FlagRegistry::standard().normalize_args(std::env::args()))
    }

    pub fn try_parse_args<I, S>(args: I) -> Result<Self, clap::Error>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::try_parse_from(FlagRegistry::standard().normalize_args(args))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_clap_agrees_with_registry() {
        let command = Cli::command();
        let registry = FlagRegistry::standard();
        for spec in registry.flags() {
            let arg = command
                .get_arguments()
                .find(|a| a.get_id().as_str() == spec.name)
                .unwrap_or_else(|| panic!("no clap argument for {}", spec.name));
            assert_eq!(arg.get_long(), Some(spec.long), "{}", spec.name);
            assert_eq!(arg.get_short(), spec.short, "{}", spec.name);
        }
        for arg in command.get_arguments() {
            let id = arg.get_id().as_str();
            assert!(id == "help" || registry.get(id).is_some(), "{}", id);
        }
    }

    #[test]
    fn test_command_is_well_formed() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_legacy_spellings() {
        let cli = Cli::try_parse_args([
            "eodms-cli",
            "-prc",
            "full",
            "-c",
            "NAPL",
            "-ov",
            "40",
            "-nord",
            "-max",
            "20",
            "-pri",
            "high",
            "-dn",
            "/tmp/downloads",
            "-s",
        ])
        .unwrap();
        assert_eq!(cli.process.as_deref(), Some("full"));
        assert_eq!(cli.overlap.as_deref(), Some("40"));
        assert!(cli.no_order);
        assert_eq!(cli.maximum.as_deref(), Some("20"));
        assert_eq!(cli.priority.as_deref(), Some("high"));
        assert_eq!(cli.downloads, Some(PathBuf::from("/tmp/downloads")));
        assert!(cli.silent);
        assert!(!cli.aws);
    }

    #[test]
    fn test_version_is_a_plain_flag() {
        let cli = Cli::try_parse_args(["eodms-cli", "-v"]).unwrap();
        assert!(cli.version);
        assert_eq!(cli.config, PathBuf::from("config.toml"));
    }
}

use clap::Parser;
use outline_map_lib::ServiceConfig;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Parser, Debug, Clone)]
#[clap(author, version, about, long_about = None)]
/// Outline Map - Show the ROUTE and PLACES sections of an outline on an interactive map
pub struct Settings {
    /// Outline JSON file to show on startup
    #[clap(short, long, value_name = "FILE")]
    pub outline: Option<PathBuf>,

    /// Access token sent to the geocoding and directions services
    #[clap(long, env = "MAPBOX_ACCESS_TOKEN", default_value = "", hide_env_values = true)]
    pub access_token: String,

    /// Scheme and host of the geocoding/directions API
    #[clap(long, default_value = "https://api.mapbox.com")]
    pub api_base_url: String,

    /// Geocoding endpoint identifier
    #[clap(long, default_value = "mapbox.places")]
    pub geocoding_provider: String,

    /// Directions profile namespace
    #[clap(long, default_value = "mapbox")]
    pub directions_provider: String,

    /// Maximum geocoding requests in flight (1 = one place at a time)
    #[clap(long, default_value = "1")]
    pub lookup_concurrency: usize,

    /// How often to check the outline file for changes, in milliseconds (0 disables)
    #[clap(long, default_value = "1000")]
    pub watch_interval_ms: u64,

    /// Show resolution diagnostics on the map
    #[clap(long, default_value = "false")]
    pub show_stats: bool,
}

impl Settings {
    pub fn from_cli() -> Self {
        eframe_entrypoints::cli::parse_args_or_exit()
    }

    pub fn service_config(&self) -> ServiceConfig {
        ServiceConfig {
            api_base_url: self.api_base_url.clone(),
            access_token: self.access_token.clone(),
            geocoding_provider: self.geocoding_provider.clone(),
            directions_provider: self.directions_provider.clone(),
            lookup_concurrency: self.lookup_concurrency.max(1),
        }
    }

    /// `None` when file watching is disabled
    pub fn watch_interval(&self) -> Option<Duration> {
        (self.watch_interval_ms > 0).then(|| Duration::from_millis(self.watch_interval_ms))
    }
}

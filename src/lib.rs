pub mod basemap;
#[cfg(feature = "cli")]
pub mod cli;
pub mod config;
pub mod coverage;
pub mod error;
pub mod fonts;
pub mod layout;
pub mod projection;
pub mod render;
pub mod scene;
pub mod theme;

#[cfg(feature = "cli")]
pub use cli::run;
pub use config::{Config, load_config};
pub use coverage::{Coverage, RegionCoverage, annotate, buffer_point, compute_coverage};
pub use error::MapError;
pub use layout::{MapLayout, ResolvedFonts, compute_layout};
pub use render::render_svg;
pub use scene::Scene;

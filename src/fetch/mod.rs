pub mod dashboard;
pub mod query;
pub mod resources;

pub use dashboard::{Dashboard, DashboardQuery};
pub use query::FetchState;
pub use resources::{
    ActivityQuery, PinnedQuery, ProfileQuery, ProjectDetail, ProjectQuery, ReposQuery, StatsQuery,
};

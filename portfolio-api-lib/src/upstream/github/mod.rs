mod contributions;
mod graphql;
mod project_repo;
mod provider;

pub use contributions::{ContributionDay, ContributionSummary, DateWindow, normalize, reformat_date};
pub use graphql::ContributionsData;
pub use project_repo::ProjectRepo;
pub use provider::Provider;

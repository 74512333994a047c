mod assessment;
mod attempt;
mod home;
mod review;
mod section;
mod state;

#[cfg(test)]
mod test_harness;
#[cfg(test)]
mod view_smoke;

pub use assessment::AssessmentView;
pub use home::HomeView;
pub use review::ReviewView;
pub use section::SectionView;
pub use state::{ViewError, ViewState, view_state_from_resource};

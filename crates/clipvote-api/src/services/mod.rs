//! Business-logic services sitting between the handlers and the
//! repositories.

pub mod rankings;
pub mod users;
pub mod videos;
pub mod votes;

pub use rankings::RankingService;
pub use users::UserService;
pub use videos::VideoService;
pub use votes::VoteService;

//! Wire models for the VoteNow REST API.

mod admin;
mod banner;
mod dashboard;
mod pagination;
mod poll;
mod user;

pub use admin::{
    AdminBanner, AdminBannerDetail, AdminPoll, AdminPollDetail, AdminPollOption, AdminStats,
    AdminUser, AdminUserDetail, AdminVote, BannerFilter, BannerUpdate, PollFilter, PollUpdate,
    ToggleActiveResponse, UserFilter, UserUpdate, VoteFilter,
};
pub use banner::{Banner, ImageUpload, NewBanner};
pub use dashboard::{AdminSummary, OptionStats, PollStats, PredictedWinner, TopPoll};
pub use pagination::{MessageResponse, Page, Paginated};
pub use poll::{NewPoll, OptionResult, Poll, PollOption, PollResults, Vote, VoteRequest};
pub use user::{LoginRequest, LoginResponse, RegisterRequest, Role, User};

/// Identifier type used by every backend resource.
pub type Id = u64;

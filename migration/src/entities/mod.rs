pub mod click_stat;
pub mod short_url;

pub use click_stat::Entity as ClickStatEntity;
pub use short_url::Entity as ShortUrlEntity;

use crate::storage::models::{ClickEvent, NewClickEvent, NewShortLink, ShortLink};
use migration::entities::{click_stat, short_url};

/// 将 Sea-ORM Model 转换为 ShortLink（点击记录单独加载）
pub fn model_to_shortlink(model: short_url::Model, clicks: Vec<ClickEvent>) -> ShortLink {
    ShortLink {
        id: model.id,
        code: model.short_code,
        original_url: model.original_url,
        created_at: model.created_at,
        clicks,
    }
}

pub fn model_to_click(model: click_stat::Model) -> ClickEvent {
    ClickEvent {
        id: model.id,
        link_id: model.short_url_id,
        clicked_at: model.clicked_at,
        client_address: model.ip_address,
        referrer: model.referrer,
        user_agent: model.user_agent,
    }
}

/// 新链接的 ActiveModel，id 交给数据库生成
pub fn new_link_to_active_model(link: &NewShortLink) -> short_url::ActiveModel {
    use sea_orm::ActiveValue::*;

    short_url::ActiveModel {
        id: NotSet,
        short_code: Set(link.code.clone()),
        original_url: Set(link.original_url.clone()),
        created_at: Set(link.created_at),
    }
}

pub fn new_click_to_active_model(click: &NewClickEvent) -> click_stat::ActiveModel {
    use sea_orm::ActiveValue::*;

    click_stat::ActiveModel {
        id: NotSet,
        short_url_id: Set(click.link_id),
        clicked_at: Set(click.clicked_at),
        ip_address: Set(click.client_address.clone()),
        referrer: Set(click.referrer.clone()),
        user_agent: Set(click.user_agent.clone()),
    }
}

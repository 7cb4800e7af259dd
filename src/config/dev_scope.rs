/// Narrow scope for development runs
///
/// A couple of tournaments with both categories and one player whose profile
/// exercises every field.
#[derive(Debug, Clone)]
pub struct DevScope {
    pub tournament_ids: &'static [&'static str],
    pub player_ids: &'static [&'static str],
    pub max_listing_pages: usize,
}

pub fn dev_scope() -> DevScope {
    DevScope {
        tournament_ids: &["swedish-padel-open-2022", "estrella-damm-menorca-open-2022"],
        player_ids: &["miguel-lamperti"],
        max_listing_pages: 1,
    }
}

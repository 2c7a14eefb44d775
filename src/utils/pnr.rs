use rand::Rng;
use sea_orm::{ColumnTrait, ConnectionTrait, EntityTrait, PaginatorTrait, QueryFilter};

use crate::entities::booking;
use crate::error::{AppError, AppResult};

pub const PNR_PREFIX: &str = "FBK";

// 900 suffixes is a small keyspace; bail out rather than spin when the
// booking table gets close to saturating it.
const MAX_ATTEMPTS: usize = 50;

fn candidate() -> String {
    let suffix: u16 = rand::thread_rng().gen_range(100..=999);
    format!("{}{}", PNR_PREFIX, suffix)
}

/// Mint a booking reference that no existing booking carries, re-drawing
/// on collision. Collisions are recovered here and never surfaced.
pub async fn generate<C: ConnectionTrait>(db: &C) -> AppResult<String> {
    for _ in 0..MAX_ATTEMPTS {
        let code = candidate();
        let taken = booking::Entity::find()
            .filter(booking::Column::Pnr.eq(&code))
            .count(db)
            .await?
            > 0;
        if !taken {
            return Ok(code);
        }
        tracing::debug!(pnr = %code, "Booking reference collision, regenerating");
    }
    Err(AppError::Internal(
        "Could not allocate a unique booking reference".to_string(),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_candidate_shape() {
        for _ in 0..100 {
            let code = candidate();
            assert_eq!(code.len(), 6);
            assert!(code.starts_with(PNR_PREFIX));
            let suffix: u16 = code[3..].parse().unwrap();
            assert!((100..=999).contains(&suffix));
        }
    }
}

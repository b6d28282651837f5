//! Ranking engine
//!
//! Two rank definitions are in use and they deliberately disagree for tied
//! users:
//!
//! - competition rank: `1 + |{ v : v.points > u.points }|`, equal for ties;
//! - positional rank: 1-based index in a stable points-descending sort, so
//!   tied users keep their insertion order and get distinct ranks.

use store::User;
use uuid::Uuid;

/// A user paired with a rank
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ranked<'a> {
    pub rank: usize,
    pub user: &'a User,
}

/// Leaderboard slice centred on one user
#[derive(Debug, Clone, PartialEq)]
pub struct Window<'a> {
    pub rankings: Vec<Ranked<'a>>,
    pub user_rank: usize,
    pub total_users: usize,
}

/// Competition rank of `user` among `users`
pub fn competition_rank(users: &[User], user: &User) -> usize {
    1 + users.iter().filter(|v| v.points > user.points).count()
}

/// Users in points-descending order; ties keep insertion order
pub fn by_points(users: &[User]) -> Vec<&User> {
    let mut sorted: Vec<&User> = users.iter().collect();
    sorted.sort_by(|a, b| b.points.cmp(&a.points));
    sorted
}

/// Positional ranks for `[offset, offset + limit)`
pub fn leaderboard(users: &[User], limit: usize, offset: usize) -> Vec<Ranked<'_>> {
    by_points(users)
        .into_iter()
        .enumerate()
        .skip(offset)
        .take(limit)
        .map(|(index, user)| Ranked {
            rank: index + 1,
            user,
        })
        .collect()
}

/// Up to `range` users either side of `user_id`, with positional ranks
pub fn window(users: &[User], user_id: Uuid, range: usize) -> Option<Window<'_>> {
    let sorted = by_points(users);
    let index = sorted.iter().position(|u| u.id == user_id)?;

    let start = index.saturating_sub(range);
    let end = sorted.len().min(index.saturating_add(range).saturating_add(1));

    let rankings = sorted[start..end]
        .iter()
        .enumerate()
        .map(|(i, &user)| Ranked {
            rank: start + i + 1,
            user,
        })
        .collect();

    Some(Window {
        rankings,
        user_rank: index + 1,
        total_users: sorted.len(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn user(name: &str, points: i64) -> User {
        let now = Utc::now();
        User {
            id: Uuid::new_v4(),
            username: name.to_string(),
            email: format!("{}@example.com", name),
            credential_digest: String::new(),
            avatar_url: String::new(),
            points,
            referral_code: name.to_uppercase(),
            referred_by: None,
            referrals_count: 0,
            waitlist_position: 0,
            joined_date: now,
            is_admin: false,
            created_at: now,
            updated_at: now,
        }
    }

    fn names(ranked: &[Ranked<'_>]) -> Vec<(String, usize)> {
        ranked
            .iter()
            .map(|r| (r.user.username.clone(), r.rank))
            .collect()
    }

    #[test]
    fn test_competition_rank_shares_ties() {
        let users = vec![user("a", 0), user("b", 0), user("c", 100)];

        assert_eq!(competition_rank(&users, &users[0]), 2);
        assert_eq!(competition_rank(&users, &users[1]), 2);
        assert_eq!(competition_rank(&users, &users[2]), 1);
    }

    #[test]
    fn test_competition_rank_counts_strictly_greater() {
        let points = [50, 10, 50, 70, 0, 10, 70];
        let users: Vec<User> = points
            .iter()
            .enumerate()
            .map(|(i, &p)| user(&format!("user{}", i), p))
            .collect();

        for u in &users {
            let greater = users.iter().filter(|v| v.points > u.points).count();
            assert_eq!(competition_rank(&users, u), greater + 1);
        }
    }

    #[test]
    fn test_leaderboard_breaks_ties_by_insertion_order() {
        let users = vec![user("a", 0), user("b", 0), user("c", 100)];

        assert_eq!(
            names(&leaderboard(&users, 10, 0)),
            vec![("c".to_string(), 1), ("a".to_string(), 2), ("b".to_string(), 3)]
        );
    }

    #[test]
    fn test_leaderboard_pages_cover_every_user_once() {
        let users: Vec<User> = (0..23)
            .map(|i| user(&format!("user{}", i), (i * 37 % 11) as i64))
            .collect();

        let mut seen = Vec::new();
        let mut offset = 0;
        loop {
            let page = leaderboard(&users, 5, offset);
            if page.is_empty() {
                break;
            }
            for (i, ranked) in page.iter().enumerate() {
                assert_eq!(ranked.rank, offset + i + 1);
            }
            seen.extend(page);
            offset += 5;
        }

        assert_eq!(seen.len(), users.len());
        assert!(seen.windows(2).all(|w| w[0].user.points >= w[1].user.points));

        let mut ids: Vec<Uuid> = seen.iter().map(|r| r.user.id).collect();
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), users.len());
    }

    #[test]
    fn test_leaderboard_offset_past_end_is_empty() {
        let users = vec![user("a", 1)];
        assert!(leaderboard(&users, 10, 5).is_empty());
        assert!(leaderboard(&users, 0, 0).is_empty());
    }

    #[test]
    fn test_window_is_clipped_at_edges() {
        let users: Vec<User> = (0..10)
            .map(|i| user(&format!("user{}", i), 100 - i as i64))
            .collect();

        let top = window(&users, users[0].id, 3).unwrap();
        assert_eq!(top.user_rank, 1);
        assert_eq!(top.total_users, 10);
        assert_eq!(top.rankings.len(), 4);
        assert_eq!(top.rankings[0].rank, 1);

        let middle = window(&users, users[5].id, 2).unwrap();
        assert_eq!(middle.user_rank, 6);
        assert_eq!(
            middle.rankings.iter().map(|r| r.rank).collect::<Vec<_>>(),
            vec![4, 5, 6, 7, 8]
        );

        let bottom = window(&users, users[9].id, 3).unwrap();
        assert_eq!(bottom.rankings.len(), 4);
        assert_eq!(bottom.rankings.last().unwrap().rank, 10);
    }

    #[test]
    fn test_window_uses_positional_rank_for_ties() {
        let users = vec![user("a", 5), user("b", 5), user("c", 5)];
        let view = window(&users, users[2].id, 0).unwrap();

        assert_eq!(view.user_rank, 3);
        assert_eq!(competition_rank(&users, &users[2]), 1);
    }

    #[test]
    fn test_window_unknown_user() {
        let users = vec![user("a", 5)];
        assert!(window(&users, Uuid::new_v4(), 5).is_none());
    }
}

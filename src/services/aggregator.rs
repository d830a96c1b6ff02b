use std::collections::HashMap;

use crate::models::{AnnotatedRate, EnrichedMovie, Movie, Rate, User, UserSummary};

/// Known users indexed by subject id
///
/// `len()` is the number of user rows given, which is the denominator of
/// the popularity index.
pub struct UserDirectory<'a> {
    by_id: HashMap<&'a str, &'a User>,
    count: usize,
}

impl<'a> UserDirectory<'a> {
    pub fn new(users: &'a [User]) -> Self {
        let by_id = users.iter().map(|u| (u.user_id.as_str(), u)).collect();
        Self {
            by_id,
            count: users.len(),
        }
    }

    pub fn get(&self, user_id: &str) -> Option<&'a User> {
        self.by_id.get(user_id).copied()
    }

    pub fn len(&self) -> usize {
        self.count
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }
}

/// Groups rates by movie, keeping each group in input order
pub fn group_rates(rates: &[Rate]) -> HashMap<&str, Vec<&Rate>> {
    let mut groups: HashMap<&str, Vec<&Rate>> = HashMap::new();
    for rate in rates {
        groups.entry(rate.imdb_id.as_str()).or_default().push(rate);
    }
    groups
}

/// Builds the viewer-relative view of one movie
///
/// `rates` must hold every rate row for `movie` (all users). Lookups that
/// miss in `users` degrade to an empty identity instead of failing.
pub fn enrich(
    movie: &Movie,
    rates: &[&Rate],
    users: &UserDirectory<'_>,
    viewer_id: &str,
) -> EnrichedMovie {
    let author = users
        .get(&movie.author_id)
        .map(UserSummary::from)
        .unwrap_or_default();

    let mut seen = false;
    let mut rate = 0;
    let mut others = Vec::new();
    let mut total: i64 = 0;

    for row in rates {
        total += i64::from(row.rate);
        if row.author_id == viewer_id {
            seen = row.seen;
            rate = row.rate;
        } else {
            others.push(AnnotatedRate::new(row, users.get(&row.author_id)));
        }
    }

    let index = if users.is_empty() {
        0.0
    } else {
        total as f64 / users.len() as f64
    };

    EnrichedMovie {
        movie: movie.clone(),
        author,
        seen,
        rate,
        rates: others,
        index,
    }
}

/// Enriches every movie against the full rate and user sets in one pass
pub fn enrich_all(
    movies: &[Movie],
    rates: &[Rate],
    users: &[User],
    viewer_id: &str,
) -> Vec<EnrichedMovie> {
    let directory = UserDirectory::new(users);
    let groups = group_rates(rates);

    movies
        .iter()
        .map(|movie| {
            let movie_rates = groups
                .get(movie.imdb_id())
                .map(Vec::as_slice)
                .unwrap_or_default();
            enrich(movie, movie_rates, &directory, viewer_id)
        })
        .collect()
}

//! Movie dimension and the movie-star junction.

use super::{Director, KeySet, Movie, NamedKeySet, Seeder, Star};
use crate::fake::{truncate_chars, FakeData, Genre};
use crate::schema::{CastLayout, DirectorLayout, MAX_CAST, MAX_TEXT_LEN, MOVIE_DIM, MOVIE_STAR};
use crate::store::{Store, Transaction};
use crate::value::SqlValue;
use anyhow::{bail, Result};
use rand::seq::index;
use rand::Rng;

const TITLE_WORDS: usize = 3;

/// Random attributes of one movie, with director and cast as indexes into
/// the supplied key sets
#[derive(Debug, Clone)]
pub struct MovieDraft {
    pub title: String,
    pub genre: Genre,
    pub director: usize,
    /// Distinct star indexes, 1 to 5 of them
    pub cast: Vec<usize>,
}

/// Draw one movie from pools of `directors` and `stars`
pub fn draft_movie<R: Rng>(fake: &mut FakeData<R>, directors: usize, stars: usize) -> Result<MovieDraft> {
    if directors == 0 {
        bail!("cannot generate movies without directors");
    }
    if stars == 0 {
        bail!("cannot generate movies without stars");
    }

    let title = truncate_chars(&fake.sentence(TITLE_WORDS), MAX_TEXT_LEN);
    let genre = fake.genre();
    let director = fake.rng().random_range(0..directors);
    let cast_size = fake.rng().random_range(1..=MAX_CAST.min(stars));
    let cast = index::sample(fake.rng(), stars, cast_size).into_vec();

    Ok(MovieDraft {
        title,
        genre,
        director,
        cast,
    })
}

/// Keys of the inserted movies and the star keys cast in each
#[derive(Debug, Default)]
pub struct MovieKeys {
    pub keys: KeySet<Movie>,
    /// `casts[i]` holds the star ids of the movie `keys.get(i)`
    pub casts: Vec<Vec<i64>>,
}

impl MovieKeys {
    /// Total number of (movie, star) pairs
    pub fn cast_links(&self) -> u64 {
        self.casts.iter().map(|c| c.len() as u64).sum()
    }
}

impl<S: Store + ?Sized, R: Rng> Seeder<'_, S, R> {
    /// Insert `count` movies drawing directors and casts from earlier phases
    pub fn populate_movies(
        &mut self,
        count: usize,
        directors: &NamedKeySet<Director>,
        stars: &NamedKeySet<Star>,
    ) -> Result<MovieKeys> {
        let layout = self.config.layout;
        let columns = layout.movie_columns();
        let mut movies = MovieKeys::default();

        let mut tx = Transaction::begin(&mut *self.store)?;
        for _ in 0..count {
            let draft = draft_movie(&mut self.fake, directors.len(), stars.len())?;

            let mut values = vec![
                SqlValue::Text(draft.title),
                SqlValue::from(draft.genre.as_str()),
            ];

            let Some((director_id, director_name)) = directors.entry(draft.director) else {
                bail!("director index {} out of range", draft.director);
            };
            match layout.director {
                DirectorLayout::Name => values.push(SqlValue::from(director_name)),
                DirectorLayout::ForeignKey => values.push(SqlValue::Int(director_id)),
            }

            let mut cast_ids = Vec::with_capacity(draft.cast.len());
            let mut cast_names = Vec::with_capacity(MAX_CAST);
            for &i in &draft.cast {
                let Some((star_id, star_name)) = stars.entry(i) else {
                    bail!("star index {} out of range", i);
                };
                cast_ids.push(star_id);
                cast_names.push(SqlValue::from(star_name));
            }

            if layout.cast == CastLayout::Embedded {
                cast_names.resize(MAX_CAST, SqlValue::Null);
                values.extend(cast_names);
            }

            let id = tx.insert_returning(MOVIE_DIM, "movie_id", &columns, &values)?;
            movies.keys.push(id);
            movies.casts.push(cast_ids);
        }
        tx.commit()?;

        Ok(movies)
    }

    /// Insert one `movie_star` row per cast member, returning the row count
    pub fn populate_movie_stars(&mut self, movies: &MovieKeys) -> Result<u64> {
        let batch_size = self.config.batch.size.max(1);
        let mut inserted = 0;
        let mut batch: Vec<Vec<SqlValue>> = Vec::with_capacity(batch_size);

        let mut tx = Transaction::begin(&mut *self.store)?;
        for (movie_id, cast) in movies.keys.ids().iter().zip(&movies.casts) {
            for &star_id in cast {
                batch.push(vec![SqlValue::Int(*movie_id), SqlValue::Int(star_id)]);
                if batch.len() >= batch_size {
                    inserted += tx.insert_rows(MOVIE_STAR, &["movie_id", "star_id"], &batch)?;
                    batch.clear();
                }
            }
        }
        inserted += tx.insert_rows(MOVIE_STAR, &["movie_id", "star_id"], &batch)?;
        tx.commit()?;

        Ok(inserted)
    }
}

//! Randomly generated data for the page template.

use rand::Rng;

#[derive(serde::Serialize)]
pub struct Context {
    pub title: String,
    pub users: Vec<User>,
}

#[derive(serde::Serialize)]
pub struct User {
    pub name: String,
    pub age: u32,
    pub is_disabled: bool,
}

/// Returns a context with `n` users.
pub fn random(n: usize) -> Context {
    let mut rng = rand::thread_rng();
    let title = word(&mut rng, 20);
    let users = (0..n)
        .map(|_| User {
            name: word(&mut rng, 12),
            age: rng.gen_range(21..100),
            is_disabled: rng.gen_ratio(1, 4),
        })
        .collect();
    Context { title, users }
}

fn word(rng: &mut impl Rng, len: usize) -> String {
    (0..len).map(|_| rng.gen_range('a'..='z')).collect()
}

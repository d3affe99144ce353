//! Random seed data for development databases and tests.

use rand::Rng;

use quill_core::domain::{Author, PostFields};

/// Number of posts seeded before each test case.
pub const SEED_COUNT: usize = 10;

const FIRST_NAMES: &[&str] = &[
    "Ada", "Grace", "Linus", "Margaret", "Dennis", "Barbara", "Ken", "Frances", "Alan", "Radia",
    "Edsger", "Hedy", "Donald", "Karen", "John", "Sophie",
];

const LAST_NAMES: &[&str] = &[
    "Lovelace", "Hopper", "Torvalds", "Hamilton", "Ritchie", "Liskov", "Thompson", "Allen",
    "Turing", "Perlman", "Dijkstra", "Lamarr", "Knuth", "Jones", "Smith", "Wilson",
];

const LOREM: &[&str] = &[
    "lorem", "ipsum", "dolor", "sit", "amet", "consectetur", "adipiscing", "elit", "sed", "do",
    "eiusmod", "tempor", "incididunt", "ut", "labore", "et", "dolore", "magna", "aliqua", "enim",
    "ad", "minim", "veniam", "quis", "nostrud", "exercitation", "ullamco", "laboris", "nisi",
    "aliquip", "ex", "ea", "commodo", "consequat",
];

fn pick<R: Rng>(rng: &mut R, words: &[&'static str]) -> &'static str {
    words[rng.gen_range(0..words.len())]
}

/// A capitalised lorem sentence ending with a period.
pub fn sentence<R: Rng>(rng: &mut R) -> String {
    let len = rng.gen_range(4..10);
    let words: Vec<&str> = (0..len).map(|_| pick(rng, LOREM)).collect();
    let text = words.join(" ");

    let mut chars = text.chars();
    match chars.next() {
        Some(first) => format!("{}{}.", first.to_uppercase(), chars.as_str()),
        None => String::new(),
    }
}

/// A few lorem paragraphs separated by blank lines.
pub fn text<R: Rng>(rng: &mut R) -> String {
    let paragraphs = rng.gen_range(1..4);
    (0..paragraphs)
        .map(|_| {
            let sentences = rng.gen_range(2..6);
            (0..sentences)
                .map(|_| sentence(rng))
                .collect::<Vec<_>>()
                .join(" ")
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}

pub fn author<R: Rng>(rng: &mut R) -> Author {
    Author::new(pick(rng, FIRST_NAMES), pick(rng, LAST_NAMES))
}

/// One random post record.
pub fn post_record<R: Rng>(rng: &mut R) -> PostFields {
    PostFields::new(sentence(rng), text(rng), author(rng))
}

/// `count` random post records.
pub fn seed_records(count: usize) -> Vec<PostFields> {
    let mut rng = rand::thread_rng();
    (0..count).map(|_| post_record(&mut rng)).collect()
}

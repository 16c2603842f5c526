use sutra::{Document, RagEngine};

const PAGES: [&str; 4] = [
    "Sanjaya describes the armies assembled on the field of Kurukshetra.",
    "Arjuna lays down his bow, unwilling to fight his own kinsmen.",
    "It is far better to do your duty, even imperfectly, than another's duty perfectly.",
    "The soul is never born and never dies.",
];

fn main() -> anyhow::Result<()> {
    let document = Document::from_pages("demo", PAGES)?;
    let engine = RagEngine::new(document)?;

    println!(
        "{} pages, {} terms\n",
        engine.count(),
        engine.vector_space().dimensions()
    );

    for query in ["What is my duty?", "Does the soul die?", "spaceship"] {
        println!("Query: {query}");
        for result in engine.retrieve(query, 2).results {
            println!("  page {} score {:.4}", result.page_index, result.score);
        }
        println!();
    }

    Ok(())
}

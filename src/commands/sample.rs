//! Handler for the `llmcount sample` command.

use crate::articles;

pub fn run(titles: bool) {
    if titles {
        for article in articles::all_articles() {
            println!("{}", article.title);
        }
        return;
    }
    println!("{}", articles::pick_article(&mut rand::thread_rng()).formatted());
}

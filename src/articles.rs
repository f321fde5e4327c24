//! Built-in sample articles.
//!
//! Stand-ins for fetched web content: long enough to produce a full top-10
//! ranking, with a handful of words repeated often enough to make counting
//! non-trivial.

use rand::Rng;
use serde::Serialize;

/// A titled sample text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SampleArticle {
    pub title: &'static str,
    pub content: &'static str,
}

impl SampleArticle {
    /// Title, a blank line, then the body.
    pub fn formatted(&self) -> String {
        format!("{}\n\n{}", self.title, self.content)
    }
}

static ARTICLES: [SampleArticle; 3] = [
    SampleArticle {
        title: "The Art of Machine Learning",
        content: "\
Machine learning lets computers improve at a task by learning from data rather than \
following rules written by hand. A machine learning model is trained on examples, and \
the quality of those examples shapes the quality of the model.

Deep learning is a branch of machine learning built on neural networks. A neural \
network passes data through layers of connected nodes, and each layer learns a \
slightly more abstract view of the data than the layer before it.

The uses of machine learning keep growing. Recommendation systems, fraud detection, \
speech recognition and image recognition all depend on models trained on large \
amounts of data. Companies invest in machine learning because good models turn data \
into decisions.

A hard problem in machine learning is generalization: a model must perform well on \
data it has never seen. Careful validation, clean training data and sensible feature \
selection all help a model generalize.

The field moves quickly. New architectures and new training techniques appear every \
year, and each one changes what machine learning can do with the data we give it.",
    },
    SampleArticle {
        title: "Climate Change and Renewable Energy",
        content: "\
Climate change is one of the defining problems of this century. Rising temperatures, \
shrinking ice sheets and more extreme weather show that the climate is changing \
faster than many expected.

Renewable energy offers a way to cut emissions. Solar energy, wind energy and \
hydroelectric energy now compete on cost with fossil fuels, and solar panels are \
cheaper and more efficient than they were a decade ago.

Wind energy has grown fast. Modern wind turbines are taller and produce more energy, \
and offshore wind farms reach steadier wind far from the coast.

Storage is the missing piece. Solar and wind energy vary with the weather, so \
batteries and other energy storage systems keep power flowing when the sun sets or \
the wind drops. Grid storage is becoming cheaper every year.

Moving to renewable energy takes work from governments, businesses and households. \
Clear policy, new technology and public support together decide how fast clean \
energy replaces the old energy system.",
    },
    SampleArticle {
        title: "The Future of Space Exploration",
        content: "\
Space exploration has held human attention for generations, and the next decades \
promise more missions than ever. Private space companies now work alongside \
national space agencies to build new space technology.

Mars remains the main target. Robotic missions to Mars have mapped its surface and \
studied its atmosphere, and several agencies plan crewed missions to Mars within the \
next twenty years.

The Moon is back in focus as a step toward deeper space. Lunar missions aim to build \
bases that could support missions to Mars and beyond, and water ice on the Moon \
could supply future space missions.

Reusable rockets have cut the cost of reaching space. Cheaper launches open space to \
satellite networks, space tourism and more scientific missions.

Space technology also pays off on Earth. Satellites carry communications, track \
weather and guide navigation, and materials first built for space missions often \
end up in medicine and engineering.",
    },
];

pub fn all_articles() -> &'static [SampleArticle] {
    &ARTICLES
}

/// Pick one article uniformly at random.
pub fn pick_article<R: Rng + ?Sized>(rng: &mut R) -> &'static SampleArticle {
    &ARTICLES[rng.gen_range(0..ARTICLES.len())]
}

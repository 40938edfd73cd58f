use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// Post ids as the feed sent them, string or number. The bundled fallback
/// posts are numbered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(untagged)]
pub enum BlogPostId {
    Number(u64),
    Text(String),
}

/// A blog post card as rendered on the site.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
pub struct BlogPost {
    pub id: BlogPostId,
    pub title: String,
    pub excerpt: String,
    pub date: String,
    pub author: String,
    pub image_url: String,
    pub url: String,
}

impl BlogPost {
    /// Posts shown when the feed cannot be reached or is empty.
    pub fn fallback() -> Vec<BlogPost> {
        vec![
            BlogPost {
                id: BlogPostId::Number(1),
                title: "The Art of Prompting GenAI: How to Talk to AI So It Actually Listens"
                    .to_string(),
                excerpt: "Unlock better results from ChatGPT and other GenAI tools with a simple framework for writing clear, effective prompts that actually work.".to_string(),
                date: "April 4, 2025".to_string(),
                author: "Travis Fleisher".to_string(),
                image_url: "https://images.squarespace-cdn.com/content/v1/66ba84180c0c523f2f950a39/1743774640926-WHFY7NRXP058EG77S2IZ/Screenshot+2025-04-04+at+9.50.06%E2%80%AFAM.png".to_string(),
                url: "https://www.twinbrain.ai/blog/hvutf9psjs7n4g5pv6p4pzm86p4hib".to_string(),
            },
            BlogPost {
                id: BlogPostId::Number(2),
                title: "Two Years Behind, Five Years Ahead".to_string(),
                excerpt: "The AI adoption curve isn't a missed boat - it's a rising tide. Jump in now and you'll still be swimming ahead of the crowd. Exploring Anthropic's newest Economic Index report.".to_string(),
                date: "March 31, 2025".to_string(),
                author: "Travis Fleisher".to_string(),
                image_url: "https://images.squarespace-cdn.com/content/v1/66ba84180c0c523f2f950a39/1743428354013-PPAZEMLWSR4FTKZBBUGD/9936aff5615c52607234549b2749629e5ecc7355-2880x1620.jpeg".to_string(),
                url: "https://www.twinbrain.ai/blog/two-years-behind-five-years-ahead".to_string(),
            },
            BlogPost {
                id: BlogPostId::Number(3),
                title: "AI Images Don't Suck Anymore".to_string(),
                excerpt: "From Meme Fodder to Marketing Gold \u{2014} AI Image Gen Just Got Real".to_string(),
                date: "March 26, 2025".to_string(),
                author: "Nik Bando".to_string(),
                image_url: "https://images.squarespace-cdn.com/content/v1/66ba84180c0c523f2f950a39/1743428826485-VBUIS2CF5OW5R0Q0KBPB/ad.jpg".to_string(),
                url: "https://www.twinbrain.ai/blog/ai-images-dont-suck-anymore".to_string(),
            },
        ]
    }
}

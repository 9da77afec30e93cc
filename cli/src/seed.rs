//! The bootstrap utility: sign in anonymously and batch-insert the fixed
//! sample dataset into the whitepaper collection. Stops with an error on
//! the first failed insert, so the process exits non-zero.

use anyhow::Context;
use chrono::DateTime;
use chrono::TimeZone;
use chrono::Utc;
use paperdeck_backend_client::FirestoreClient;
use paperdeck_backend_client::IdentityClient;
use paperdeck_backend_client::NewWhitepaper;
use paperdeck_core::Config;
use paperdeck_core::provider::IdentityProvider;
use tracing::info;

use crate::providers;

pub async fn run(config: &Config) -> anyhow::Result<()> {
    let http = providers::http_client()?;
    let identity_client = IdentityClient::new(http.clone(), config.store.api_key.clone());
    let identity = identity_client
        .sign_in_anonymously()
        .await
        .context("anonymous sign-in failed")?;
    info!(uid = %identity.uid, "seed sign-in complete");
    println!("signed in as {}", identity.uid);

    let store = FirestoreClient::new(http, &config.store);
    let path = config.collection_path();
    let papers = sample_whitepapers();
    println!("uploading {} whitepapers to {path}", papers.len());

    for paper in &papers {
        let id = store
            .create_document(&path, &identity, paper)
            .await
            .with_context(|| format!("uploading \"{}\"", paper.title))?;
        info!(%id, title = %paper.title, "uploaded whitepaper");
        println!("uploaded \"{}\" ({id})", paper.title);
    }
    println!("done: {} whitepapers uploaded", papers.len());
    Ok(())
}

fn date(year: i32, month: u32, day: u32) -> Option<DateTime<Utc>> {
    Utc.with_ymd_and_hms(year, month, day, 0, 0, 0).single()
}

fn paper(
    title: &str,
    summary: &str,
    topic: &str,
    link: &str,
    published: Option<DateTime<Utc>>,
) -> NewWhitepaper {
    NewWhitepaper {
        title: title.to_string(),
        summary: summary.to_string(),
        topic: topic.to_string(),
        link: Some(link.to_string()),
        publication_date: published,
    }
}

/// The fixed sample dataset: ten well-known papers, two per category.
fn sample_whitepapers() -> Vec<NewWhitepaper> {
    vec![
        paper(
            "Attention Is All You Need",
            "This paper introduces the Transformer architecture, a novel neural network design \
             that relies entirely on attention mechanisms, dispensing with recurrence and \
             convolutions entirely. The model achieves superior results in machine translation \
             tasks.",
            "AI & Machine Learning",
            "https://arxiv.org/abs/1706.03762",
            date(2017, 6, 12),
        ),
        paper(
            "Bitcoin: A Peer-to-Peer Electronic Cash System",
            "This whitepaper introduces Bitcoin, a purely peer-to-peer version of electronic \
             cash that allows online payments to be sent directly from one party to another \
             without going through a financial institution.",
            "Decentralized Finance",
            "https://bitcoin.org/bitcoin.pdf",
            date(2008, 10, 31),
        ),
        paper(
            "Quantum Supremacy Using a Programmable Superconducting Processor",
            "Google AI demonstrates quantum supremacy by performing a computation in 200 seconds \
             that would take the world's fastest supercomputer 10,000 years to complete using a \
             53-qubit quantum processor.",
            "Quantum Computing",
            "https://www.nature.com/articles/s41586-019-1666-5",
            date(2019, 10, 23),
        ),
        paper(
            "CRISPR-Cas9: A Revolutionary Gene Editing Tool",
            "This paper details the development and application of CRISPR-Cas9 technology for \
             precise genome editing, opening new possibilities for treating genetic diseases and \
             advancing biological research.",
            "Biotechnology",
            "https://www.science.org/doi/10.1126/science.1225829",
            date(2012, 8, 17),
        ),
        paper(
            "High-Efficiency Perovskite Solar Cells: Challenges and Solutions",
            "Comprehensive analysis of perovskite solar cell technology, addressing stability \
             issues related to moisture and temperature while proposing novel encapsulation \
             methods for commercial viability.",
            "Renewable Energy",
            "https://www.nature.com/articles/s41560-020-0558-0",
            date(2020, 3, 15),
        ),
        paper(
            "GPT-3: Language Models are Few-Shot Learners",
            "OpenAI presents GPT-3, a 175 billion parameter language model that achieves strong \
             performance on many NLP tasks without task-specific fine-tuning, demonstrating \
             impressive few-shot learning capabilities.",
            "AI & Machine Learning",
            "https://arxiv.org/abs/2005.14165",
            date(2020, 5, 28),
        ),
        paper(
            "Ethereum: A Secure Decentralised Generalised Transaction Ledger",
            "The Ethereum Yellow Paper describes a blockchain-based distributed computing \
             platform featuring smart contract functionality, enabling decentralized \
             applications (DApps) and programmable money.",
            "Decentralized Finance",
            "https://ethereum.github.io/yellowpaper/paper.pdf",
            date(2014, 4, 1),
        ),
        paper(
            "Shor's Algorithm: Quantum Integer Factorization",
            "Peter Shor's groundbreaking algorithm demonstrates how quantum computers could \
             factor large integers exponentially faster than classical computers, with profound \
             implications for cryptography.",
            "Quantum Computing",
            "https://arxiv.org/abs/quant-ph/9508027",
            date(1995, 8, 20),
        ),
        paper(
            "mRNA Vaccine Technology: Principles and Applications",
            "Exploration of messenger RNA vaccine technology, detailing the mechanisms by which \
             synthetic mRNA directs cells to produce antigens, revolutionizing vaccine \
             development and pandemic response.",
            "Biotechnology",
            "https://www.nature.com/articles/nrd.2017.243",
            date(2018, 1, 12),
        ),
        paper(
            "Next-Generation Wind Turbine Design: Efficiency Improvements",
            "Analysis of advanced wind turbine blade designs incorporating aerodynamic \
             optimization and smart materials to increase energy capture efficiency by 15-20% \
             compared to traditional models.",
            "Renewable Energy",
            "https://www.sciencedirect.com/science/article/pii/S0960148121000012",
            date(2021, 2, 10),
        ),
    ]
}

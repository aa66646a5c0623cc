//! CLI module - Command-line interface for Cinetrend
//!
//! This module provides a structured CLI using clap for argument parsing.

mod commands;

use clap::{Parser, Subcommand};

/// Cinetrend - Movie search with trending searches
#[derive(Parser)]
#[command(name = "cinetrend")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the HTTP API server
    #[command(alias = "web", alias = "-d", alias = "--daemon")]
    Serve,

    /// Search the movie catalog and count the search
    #[command(alias = "s")]
    Search {
        /// Search query
        #[arg(required = true)]
        query: Vec<String>,
    },

    /// List currently popular movies
    #[command(alias = "p")]
    Popular,

    /// Show the most searched terms
    #[command(alias = "t")]
    Trending,

    /// Search interactively: each stdin line replaces the query
    #[command(alias = "b")]
    Browse,

    /// Create default config file
    #[command(alias = "--init")]
    Init,
}

pub use commands::*;

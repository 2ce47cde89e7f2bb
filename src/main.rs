//! review-advisor
//!
//! Usage:
//!   review-advisor chat "<restaurant features>"       Interactive consulting chat
//!   review-advisor analyze <restaurantId> [out.json]  Summarize customer reviews
//!   review-advisor reviews <restaurantId>             Print raw review documents

fn main() -> anyhow::Result<()> {
    review_advisor::run()
}

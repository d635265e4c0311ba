//! Known Meme Coins
//!
//! Provider ids of the coins shown under the "memes" view. The list is
//! static; membership is by exact id, not by name or symbol.

/// CoinGecko ids of well-known meme coins
pub const MEME_COIN_IDS: &[&str] = &[
    "dogecoin",
    "shiba-inu",
    "pepe",
    "bonk",
    "dogwifcoin",
    "floki",
    "book-of-meme",
    "brett",
    "popcat",
    "mog-coin",
    "cat-in-a-dogs-world",
    "memecoin-2",
    "baby-doge-coin",
    "dogelon-mars",
    "turbo",
    "official-trump",
    "fartcoin",
    "pudgy-penguins",
    "spx6900",
    "peanut-the-squirrel",
    "goatseus-maximus",
    "myro",
    "wen-4",
    "samoyedcoin",
];

/// Check if a provider id is on the meme coin list
pub fn is_meme_coin(id: &str) -> bool {
    let id = id.trim();
    MEME_COIN_IDS.iter().any(|m| m.eq_ignore_ascii_case(id))
}

//! The fixed list of dishes the roulette draws from.
//!
//! Names and queries stay in Traditional Chinese: the query string is sent
//! verbatim as the Places keyword and has to match local listings.

use rand::Rng;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FoodOption {
    pub name: &'static str,
    pub category: &'static str,
    /// Search keyword; also the identity of the option.
    pub query: &'static str,
}

const fn food(name: &'static str, category: &'static str, query: &'static str) -> FoodOption {
    FoodOption { name, category, query }
}

const TAIWANESE: &str = "台式與中式經典";
const JAPANESE: &str = "日式風味";
const HOT_POT: &str = "火鍋與暖湯";
const WESTERN: &str = "西式與美墨料理";
const ASIAN: &str = "韓式與泰越南洋風";
const SNACKS: &str = "夜市小吃與其他";

pub static FOOD_OPTIONS: &[FoodOption] = &[
    food("滷肉飯/雞肉飯", TAIWANESE, "滷肉飯 雞肉飯"),
    food("牛肉麵", TAIWANESE, "牛肉麵"),
    food("排骨飯/雞腿飯", TAIWANESE, "排骨飯 雞腿飯"),
    food("水餃/鍋貼", TAIWANESE, "水餃 鍋貼"),
    food("炒飯", TAIWANESE, "炒飯"),
    food("炒麵/炒米粉", TAIWANESE, "炒麵 炒米粉"),
    food("廣東粥/皮蛋瘦肉粥", TAIWANESE, "廣東粥 皮蛋瘦肉粥"),
    food("小籠包/蒸餃", TAIWANESE, "小籠包 蒸餃"),
    food("潤餅", TAIWANESE, "潤餅"),
    food("熱炒", TAIWANESE, "熱炒"),
    food("烤鴨", TAIWANESE, "烤鴨"),
    food("清粥小菜", TAIWANESE, "清粥小菜"),
    food("拉麵", JAPANESE, "拉麵"),
    food("烏龍麵", JAPANESE, "烏龍麵"),
    food("日式咖哩飯", JAPANESE, "日式咖哩飯"),
    food("丼飯", JAPANESE, "丼飯"),
    food("生魚片/壽司", JAPANESE, "壽司 生魚片"),
    food("壽喜燒", JAPANESE, "壽喜燒"),
    food("大阪燒/廣島燒", JAPANESE, "大阪燒 廣島燒"),
    food("蕎麥麵", JAPANESE, "蕎麥麵"),
    food("天婦羅定食", JAPANESE, "天婦羅"),
    food("個人小火鍋", HOT_POT, "小火鍋 涮涮鍋"),
    food("麻辣鍋", HOT_POT, "麻辣鍋"),
    food("羊肉爐", HOT_POT, "羊肉爐"),
    food("薑母鴨", HOT_POT, "薑母鴨"),
    food("壽喜燒吃到飽", HOT_POT, "壽喜燒吃到飽"),
    food("部隊鍋", HOT_POT, "部隊鍋"),
    food("關東煮", HOT_POT, "關東煮"),
    food("牛肉湯/羊肉湯", HOT_POT, "牛肉湯 羊肉湯"),
    food("牛排", WESTERN, "牛排"),
    food("義大利麵", WESTERN, "義大利麵"),
    food("燉飯", WESTERN, "燉飯"),
    food("美式漢堡", WESTERN, "美式漢堡"),
    food("披薩", WESTERN, "披薩 Pizza"),
    food("墨西哥捲餅", WESTERN, "墨西哥料理"),
    food("凱薩沙拉/溫沙拉", WESTERN, "沙拉 輕食"),
    food("三明治/帕尼尼", WESTERN, "三明治 帕尼尼"),
    food("韓式炸雞", ASIAN, "韓式炸雞"),
    food("石鍋拌飯", ASIAN, "石鍋拌飯"),
    food("韓式烤肉", ASIAN, "韓式烤肉"),
    food("辣炒年糕", ASIAN, "辣炒年糕"),
    food("泰式打拋豬飯", ASIAN, "泰式料理 打拋豬"),
    food("泰式綠咖哩", ASIAN, "泰式料理 綠咖哩"),
    food("越南河粉", ASIAN, "越南河粉"),
    food("越南法國麵包", ASIAN, "越南法國麵包"),
    food("海南雞飯", ASIAN, "海南雞飯"),
    food("肉骨茶", ASIAN, "肉骨茶"),
    food("鹹酥雞/炸物", SNACKS, "鹹酥雞 炸物"),
    food("加熱滷味/冷滷味", SNACKS, "滷味"),
    food("夏威夷拌飯", SNACKS, "夏威夷拌飯 Poke"),
];

/// Uniform pick from [`FOOD_OPTIONS`].
pub fn draw<R: Rng + ?Sized>(rng: &mut R) -> &'static FoodOption {
    &FOOD_OPTIONS[rng.gen_range(0..FOOD_OPTIONS.len())]
}

/// Distinct categories in catalog order.
pub fn categories() -> Vec<&'static str> {
    let mut seen: Vec<&'static str> = Vec::new();
    for option in FOOD_OPTIONS {
        if !seen.contains(&option.category) {
            seen.push(option.category);
        }
    }
    seen
}

pub fn find_by_query(query: &str) -> Option<&'static FoodOption> {
    FOOD_OPTIONS.iter().find(|o| o.query == query)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{rngs::StdRng, SeedableRng};
    use std::collections::HashSet;

    #[test]
    fn queries_are_unique_and_non_empty() {
        let queries: HashSet<_> = FOOD_OPTIONS.iter().map(|o| o.query).collect();
        assert_eq!(queries.len(), FOOD_OPTIONS.len());
        assert!(FOOD_OPTIONS.iter().all(|o| !o.query.trim().is_empty()));
    }

    #[test]
    fn catalog_has_fifty_dishes() {
        assert_eq!(FOOD_OPTIONS.len(), 50);
    }

    #[test]
    fn six_categories_in_catalog_order() {
        assert_eq!(categories(), [TAIWANESE, JAPANESE, HOT_POT, WESTERN, ASIAN, SNACKS]);
    }

    #[test]
    fn draw_stays_inside_catalog() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..200 {
            let pick = draw(&mut rng);
            assert_eq!(find_by_query(pick.query), Some(pick));
        }
    }
}

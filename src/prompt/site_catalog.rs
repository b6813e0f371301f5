use once_cell::sync::Lazy;

/// A titled group of World Heritage sites in China
pub struct CatalogSection {
    pub title: &'static str,
    pub sites: &'static [&'static str],
}

/// Closed reference list the resolver shows the model, as users name the sites
pub const SITE_CATALOG: &[CatalogSection] = &[
    CatalogSection {
        title: "Cultural heritage",
        sites: &[
            "北京故宫",
            "天坛",
            "颐和园",
            "长城",
            "秦始皇陵及兵马俑",
            "莫高窟",
            "龙门石窟",
            "云冈石窟",
            "平遥古城",
            "苏州古典园林",
            "福建土楼",
            "丽江古城",
            "布达拉宫",
            "开平碉楼与村落",
            "泰山",
            "殷墟",
            "曲阜孔庙、孔府、孔林",
            "清东陵",
            "宏村和西递古村落",
            "泉州：“宋代海外贸易中心”",
            "交河故城",
            "高昌故城",
            "明清皇家陵寝",
            "承德避暑山庄及周围寺庙",
            "武当山",
            "澳门历史城区",
            "大足石刻",
            "北京周口店遗址",
            "明孝陵",
            "大运河",
            "良渚古城遗址",
        ],
    },
    CatalogSection {
        title: "Natural heritage",
        sites: &[
            "黄山风景区",
            "九寨沟风景区",
            "武陵源风景名胜区",
            "三江并流",
            "中国南方喀斯特",
            "四川大熊猫栖息地",
            "庐山",
            "梵净山",
            "石林风景区",
            "神农架",
            "张掖丹霞地貌",
            "三清山",
            "长白山",
            "黄龙风景名胜区",
        ],
    },
    CatalogSection {
        title: "Mixed heritage",
        sites: &["都江堰－青城山", "峨眉山－乐山大佛", "武夷山", "红河哈尼梯田"],
    },
];

/// The catalog rendered once as a markdown list for prompt embedding
pub static CATALOG_MARKDOWN: Lazy<String> = Lazy::new(|| render_catalog(SITE_CATALOG));

pub fn render_catalog(sections: &[CatalogSection]) -> String {
    let mut out = String::from("# World Heritage sites in China\n");

    for section in sections {
        out.push_str(&format!("\n## {} ({})\n\n", section.title, section.sites.len()));
        for (index, site) in section.sites.iter().enumerate() {
            out.push_str(&format!("{}. {}\n", index + 1, site));
        }
    }

    out
}

//! Test fixture creation
//!
//! Writes the recipe dataset used by the end-to-end tests to a temporary
//! directory. Recipe names are mirrored in `constants.rs`.

use std::path::PathBuf;
use tempfile::TempDir;

pub const FIXTURE_HEADER: &str = "dish_name,description,ingredients_json,steps_json,prep_time_min,cook_time_min,servings,difficulty,cuisine_type,meal_type,tags,mood,weather_suggestion,time_suggestion";

const FIXTURE_ROWS: &[&str] = &[
    r#"Margherita Pizza,Classic tomato and mozzarella,"[{""name"":""flour"",""qty"":""500"",""unit"":""g""},{""name"":""mozzarella"",""qty"":""200"",""unit"":""g""}]","[""Make the dough"",""Top and bake""]",30,15,4,easy,italian,dinner,"cheesy, classic",happy,any,evening"#,
    r#"Chicken Tacos,Crunchy and bright,"[{""name"":""tortillas"",""qty"":8},{""name"":""chicken"",""qty"":""400"",""unit"":""g"",""note"":""thighs""}]","[""Grill the chicken"",""Fill the tortillas""]",20,15,4,easy,mexican,lunch,"spicy, quick",Happy,sunny,afternoon"#,
    r#"Tonkotsu Ramen,Rich pork broth,"[{""name"":""pork bones"",""qty"":""1"",""unit"":""kg""}]","[""Simmer the broth"",""Cook the noodles"",""Assemble""]",60,720,2,hard,japanese,dinner,comfort,cozy,rainy,evening"#,
    r#"Tomato Soup,Silky and warming,"[{""name"":""tomatoes"",""qty"":""1"",""unit"":""kg""}]","[{""step"":""Roast the tomatoes""},{""step"":""Blend""}]",10,40,,easy,american,lunch,"comfort, vegetarian",cozy,cold,any"#,
    r#"Green Smoothie,A quick boost,"[""spinach"",""banana"",""oat milk""]","[""Blend everything""]",5,0,1,,,breakfast,"quick, vegan, quick",energetic,any,morning"#,
    r#"Mystery Stew,Nobody knows,not json,"[""Stir slowly""]",15,90,6,medium,british,dinner,,sad,cold,evening"#,
];

/// The fixture dataset as CSV text, header included.
pub fn fixture_csv() -> String {
    let mut csv = String::from(FIXTURE_HEADER);
    for row in FIXTURE_ROWS {
        csv.push('\n');
        csv.push_str(row);
    }
    csv.push('\n');
    csv
}

/// Writes `csv` to `recipes.csv` in a fresh temporary directory.
///
/// The directory is deleted when the returned `TempDir` is dropped.
pub fn create_test_dataset(csv: &str) -> anyhow::Result<(TempDir, PathBuf)> {
    let temp_dir = TempDir::new()?;
    let dataset_path = temp_dir.path().join("recipes.csv");
    std::fs::write(&dataset_path, csv)?;
    Ok((temp_dir, dataset_path))
}

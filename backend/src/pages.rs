use serde::Serialize;

#[derive(Debug, Serialize, Clone, Copy, PartialEq, Eq)]
pub enum Page {
    Introduction,
    Analysis,
    #[serde(rename = "Model Classification")]
    ModelClassification,
}

impl Page {
    pub const ALL: [Page; 3] = [Page::Introduction, Page::Analysis, Page::ModelClassification];
}

#[derive(Debug, Serialize)]
pub struct FeatureDescription {
    pub name: &'static str,
    pub description: &'static str,
}

#[derive(Debug, Serialize)]
pub struct Introduction {
    pub title: &'static str,
    pub heading: &'static str,
    pub text: &'static str,
    pub features: Vec<FeatureDescription>,
}

const INTRODUCTION_TEXT: &str = "In the vibrant culinary landscape of Bangalore, Zomato serves as a \
crucial platform for food lovers, offering insights into a diverse array of restaurants. This \
project analyzes restaurant data from Zomato, focusing on key metrics such as customer ratings, \
cuisines, price ranges, and geographic distribution, to uncover trends, popular dining spots, and \
customer preferences in Bangalore's food scene.";

const DATASET_FEATURES: [(&str, &str); 17] = [
    ("url", "URL of the restaurant on the Zomato website."),
    ("address", "Address of the restaurant in Bengaluru."),
    ("name", "Name of the restaurant."),
    ("online_order", "Whether online ordering is available in the restaurant or not."),
    ("book_table", "Table booking option available or not."),
    ("rate", "Overall rating of the restaurant out of 5."),
    ("votes", "Total number of ratings for the restaurant."),
    ("phone", "Phone number of the restaurant."),
    ("location", "Neighborhood in which the restaurant is located."),
    ("rest_type", "Restaurant type."),
    ("dish_liked", "Dishes people liked in the restaurant."),
    ("cuisines", "Food styles, separated by commas."),
    ("approx_cost(for two people)", "Approximate cost for a meal for two people."),
    ("reviews_list", "List of tuples containing reviews for the restaurant."),
    ("menu_item", "List of menus available in the restaurant."),
    ("listed_in(type)", "Type of meal."),
    ("listed_in(city)", "Neighborhood in which the restaurant is listed."),
];

pub fn introduction() -> Introduction {
    Introduction {
        title: "Zomato Bangalore Restaurants",
        heading: "Dataset Feature Overview",
        text: INTRODUCTION_TEXT,
        features: DATASET_FEATURES
            .iter()
            .map(|&(name, description)| FeatureDescription { name, description })
            .collect(),
    }
}

#[derive(Debug, Serialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FieldKind {
    Text,
    Select { choices: &'static [&'static str] },
}

#[derive(Debug, Serialize)]
pub struct FormField {
    pub name: &'static str,
    pub label: &'static str,
    #[serde(flatten)]
    pub kind: FieldKind,
}

const YES_NO: &[&str] = &["Yes", "No"];
const COST: &[&str] = &["High Cost", "Low Cost"];

fn field(name: &'static str, label: &'static str, kind: FieldKind) -> FormField {
    FormField { name, label, kind }
}

/// Fields of the Model Classification form, in feature column order.
pub fn prediction_form() -> Vec<FormField> {
    use FieldKind::{Select, Text};

    vec![
        field("url", "Please write the restaurant URL", Text),
        field("address", "Please write your address", Text),
        field("name", "Please write your name", Text),
        field("online_order", "Is online ordering available?", Select { choices: YES_NO }),
        field("book_table", "Is table booking option available?", Select { choices: YES_NO }),
        field("rate", "Please write your rating", Text),
        field("location", "Please write your location", Text),
        field("rest_type", "Please write your restaurant type", Text),
        field("dish_liked", "Please write the dish liked", Text),
        field("cuisines", "Please write your cuisines", Text),
        field("menu_item", "Please write your menu items", Text),
        field("dining_type", "Please write your dining type", Text),
        field("location_city", "Please write your location city", Text),
        field("cost_category", "Please select your cost category", Select { choices: COST }),
        field("online_booking_combined", "Combine online order and booking?", Select { choices: YES_NO }),
        field("vote_category", "Please provide the vote category", Text),
    ]
}

pub mod month_grid;

pub use month_grid::{
    add_months, days_in_month, is_selected, month_name, navigate, toggle_day, visible_days,
    Direction, GridDay,
};

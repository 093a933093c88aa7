pub mod a001_monthly_sales;
pub mod d100_sales_charts;

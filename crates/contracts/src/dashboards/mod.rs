pub mod d100_sales_charts;

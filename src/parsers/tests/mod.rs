mod product_parser_unit_tests;

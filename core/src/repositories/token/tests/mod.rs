mod columns_tests;
